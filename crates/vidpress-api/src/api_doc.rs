//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Vidpress API",
        version = "0.1.0",
        description = "Video compression service. Upload a video with a target quality percentage and receive a zip archive holding the re-encoded MP4 and a JPEG thumbnail."
    ),
    paths(
        handlers::root::root,
        handlers::video_compress::upload_video,
    ),
    components(
        schemas(
            error::ErrorResponse,
            handlers::root::RootResponse,
            handlers::video_compress::VideoUploadForm,
        )
    ),
    tags(
        (name = "service", description = "Service information"),
        (name = "videos", description = "Video compression")
    )
)]
pub struct ApiDoc;
