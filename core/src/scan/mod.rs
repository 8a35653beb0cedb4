pub mod axe;
pub mod command;
pub mod gateway;
pub mod model;
pub mod reference;
pub mod url_check;
