// Declare modules within this crate
pub mod error; // Error model and classification
pub mod http; // Envelope, request decoding, response writing
pub mod id; // UUID helpers
pub mod logging; // Logging utilities
pub mod time; // ISO-8601 time wrapper

// Re-export error types and utilities for easier access
pub use error::{
    as_api_error, classify, is_bad_request, is_server_error, is_unauthenticated,
    is_unauthorized, root_cause, ApiError, BoxError, Context, ErrorKind, ParamValue, Params,
    WrappedError,
};

// Re-export HTTP utilities for easier access
pub use http::{
    envelope::GenericResponse,
    handle_result,
    request::{
        decode_json, extract_body_and_files, extract_body_and_files_with, extract_file,
        extract_file_with, extract_files, extract_files_with, extract_uuid, FileDetails,
        FileWithBody, RequestError, MAX_JSON_BODY, MAX_UPLOAD_MEMORY,
    },
    response::{
        write_error, write_file, write_json, write_no_content, write_success, STANDARD_HEADERS,
    },
    sniff::sniff_content_type,
    HandlerError,
};

// Re-export logging utilities for easier access
pub use logging::{init, init_with_level, log_error, log_result};

// This crate holds the HTTP service toolkit shared by every service: a structured
// error model, the JSON response envelope, request decoders and response writers.
