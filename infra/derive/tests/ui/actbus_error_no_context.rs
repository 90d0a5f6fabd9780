use actbus_derive::actbus_error;

#[actbus_error]
pub enum TransformFault {
    #[error("Parse error: {source}")]
    Parse {
        #[source]
        source: std::num::ParseIntError,
    },
}

fn main() {}
