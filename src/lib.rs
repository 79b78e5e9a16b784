pub mod bias;
pub mod chart;
pub mod cli;
pub mod config;
pub mod dice_set;
pub mod report;
pub mod rolls;
pub mod util;
