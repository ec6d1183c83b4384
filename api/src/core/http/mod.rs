pub mod text_response;
