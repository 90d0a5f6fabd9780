use actbus_derive::actbus_error;

#[actbus_error]
pub struct NotAnEnum {
    message: String,
}

fn main() {}
