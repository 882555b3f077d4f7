mod charge;
mod product;
mod profile;
mod scoreboard;

pub use charge::{Charge, NewCharge};
pub use product::{NewProduct, Product};
pub use profile::Profile;
pub use scoreboard::Scoreboard;
