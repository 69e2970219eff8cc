pub mod token_request;
pub mod token_response;
