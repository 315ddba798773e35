pub mod common;
pub mod requests;
pub mod responses;

pub use common::{parse_list, parse_timestamp};
pub use requests::StatsQuery;
pub use responses::{Ad, AdGroup, Campaign, Statistic};
