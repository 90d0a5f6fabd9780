use actbus_derive::actbus_error;
use std::borrow::Cow;

#[actbus_error]
pub enum ChannelError {
    #[error("Format error{}: {source}", format_context(.context))]
    Format {
        #[source]
        source: std::fmt::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Closed{}: {message}", format_context(.context))]
    Closed { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn main() {
    let err: ChannelError = std::fmt::Error.into();
    let _ = err.to_string();
}
