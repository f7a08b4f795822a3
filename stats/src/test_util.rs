use std::time::Duration;

use mockall::mock;

use crate::{Error, Stats, Tags};

mock! {
    pub Stats {}

    impl Stats for Stats {
        fn inc(&self, name: &str, value: i64, rate: f32, tags: &Tags) -> Result<(), Error>;
        fn dec(&self, name: &str, value: i64, rate: f32, tags: &Tags) -> Result<(), Error>;
        fn gauge(&self, name: &str, value: f64, rate: f32, tags: &Tags) -> Result<(), Error>;
        fn timing(&self, name: &str, value: Duration, rate: f32, tags: &Tags) -> Result<(), Error>;
        fn close(&self) -> Result<(), Error>;
    }
}
