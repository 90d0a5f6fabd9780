use actbus_derive::actbus_error;

#[actbus_error]
pub enum TransformFault {
    #[error("Parse error: {0}")]
    Parse(std::num::ParseIntError),
}

fn main() {}
