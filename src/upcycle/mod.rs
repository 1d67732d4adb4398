pub mod audit;
pub mod carbon;
pub mod config;
pub mod fallback;
pub mod model;
pub mod normalize;
pub mod paths;
pub mod parser;
pub mod pipeline;
pub mod prompt;
pub mod provider;
pub mod records;
pub mod util;
pub mod warn;
