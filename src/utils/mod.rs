mod constants;
mod constants_config;
mod math_helpers;

pub use constants::*;
pub use constants_config::*;
pub use math_helpers::*;

#[cfg(test)]
mod constants_config_tests;
