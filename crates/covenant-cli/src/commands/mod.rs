pub mod covenant;
pub mod forecast;
pub mod waiver;
