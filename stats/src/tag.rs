use std::{borrow::Cow, fmt, slice};

use crate::TagsError;

/// A string that is either borrowed for `'static` or owned.
pub type SharedString = Cow<'static, str>;

/// A single key/value pair attached to a metric.
///
/// Tags are used for dimensional filtering downstream: the same metric name can be recorded with different tags, such
/// as the region or host that produced it, and the collector can slice the data by any of them.
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub struct Tag(SharedString, SharedString);

impl Tag {
    /// Creates a [`Tag`] from a key and value.
    pub fn new<K, V>(key: K, value: V) -> Self
    where
        K: Into<SharedString>,
        V: Into<SharedString>,
    {
        Tag(key.into(), value.into())
    }

    /// Creates a [`Tag`] from a static key and value.
    pub const fn from_static_parts(key: &'static str, value: &'static str) -> Self {
        Tag(Cow::Borrowed(key), Cow::Borrowed(value))
    }

    /// Key of this tag.
    pub fn key(&self) -> &str {
        self.0.as_ref()
    }

    /// Value of this tag.
    pub fn value(&self) -> &str {
        self.1.as_ref()
    }

    /// Consumes this [`Tag`], returning the key and value.
    pub fn into_parts(self) -> (SharedString, SharedString) {
        (self.0, self.1)
    }
}

impl<K, V> From<(K, V)> for Tag
where
    K: Into<SharedString>,
    V: Into<SharedString>,
{
    fn from(pair: (K, V)) -> Tag {
        Tag::new(pair.0, pair.1)
    }
}

/// An ordered set of tags.
///
/// Insertion order is preserved and duplicate keys are kept as-is: both are visible in the encoded output, so a tag set
/// always encodes the same way for the same sequence of insertions.
#[derive(PartialEq, Eq, Hash, Clone, Debug, Default)]
pub struct Tags(Vec<Tag>);

impl Tags {
    /// Creates an empty tag set.
    pub const fn new() -> Self {
        Tags(Vec::new())
    }

    /// Builds a tag set from free-form alternating key/value scalars.
    ///
    /// `["region", "eu", "host", "a"]` yields the tags `region=eu` and `host=a`.
    ///
    /// # Errors
    ///
    /// If an odd number of scalars is given, the trailing key has no value and [`TagsError::OddLength`] is returned.
    /// Nothing is truncated.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self, TagsError>
    where
        I: IntoIterator<Item = S>,
        S: Into<SharedString>,
    {
        let scalars = pairs.into_iter().map(Into::into).collect::<Vec<_>>();
        if scalars.len() % 2 != 0 {
            return Err(TagsError::OddLength { len: scalars.len() });
        }

        let mut tags = Vec::with_capacity(scalars.len() / 2);
        let mut scalars = scalars.into_iter();
        while let (Some(key), Some(value)) = (scalars.next(), scalars.next()) {
            tags.push(Tag(key, value));
        }

        Ok(Tags(tags))
    }

    /// Appends a tag to the end of the set.
    pub fn push<T: Into<Tag>>(&mut self, tag: T) {
        self.0.push(tag.into());
    }

    /// Adds a tag, returning the updated set.
    #[must_use]
    pub fn with<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<SharedString>,
        V: Into<SharedString>,
    {
        self.0.push(Tag::new(key, value));
        self
    }

    /// Returns a new set holding the tags of `first` followed by the tags of `second`.
    pub fn concat(first: &Tags, second: &Tags) -> Tags {
        let mut tags = Vec::with_capacity(first.len() + second.len());
        tags.extend(first.iter().cloned());
        tags.extend(second.iter().cloned());
        Tags(tags)
    }

    /// Number of tags in the set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the set holds no tags.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the tags in insertion order.
    pub fn iter(&self) -> slice::Iter<'_, Tag> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a Tags {
    type Item = &'a Tag;
    type IntoIter = slice::Iter<'a, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<T: Into<Tag>> FromIterator<T> for Tags {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Tags(iter.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Tag>> Extend<T> for Tags {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.0.extend(iter.into_iter().map(Into::into));
    }
}

impl<T: Into<Tag>, const N: usize> From<[T; N]> for Tags {
    fn from(tags: [T; N]) -> Self {
        tags.into_iter().collect()
    }
}

impl From<Vec<Tag>> for Tags {
    fn from(tags: Vec<Tag>) -> Self {
        Tags(tags)
    }
}

impl fmt::Display for Tags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, tag) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}={}", tag.key(), tag.value())?;
        }
        Ok(())
    }
}

/// Builds a [`Tags`] set from `key => value` pairs.
///
/// ```
/// let tags = stats::tags!("region" => "eu", "host" => "a");
/// assert_eq!(tags.len(), 2);
///
/// let empty = stats::tags!();
/// assert!(empty.is_empty());
/// ```
#[macro_export]
macro_rules! tags {
    () => {
        $crate::Tags::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        $crate::Tags::from([$($crate::Tag::new($key, $value)),+])
    };
}
