//! External collaborators: daily bars from Polygon.io and the list of
//! tradable common stocks from the NasdaqTrader symbol directory.

pub mod nasdaq_trader;
pub mod polygon;

pub use nasdaq_trader::NasdaqTraderDirectory;
pub use polygon::PolygonClient;
