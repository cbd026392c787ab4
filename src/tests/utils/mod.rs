pub mod io;
pub mod webhook;
