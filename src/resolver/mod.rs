pub mod finder;
pub mod locator;
