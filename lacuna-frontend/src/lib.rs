extern crate bit_vec;
extern crate image;
extern crate lacuna;

pub mod input;
pub mod output;
