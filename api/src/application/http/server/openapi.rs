use crate::application::http::low_query::router::LowQueryApiDoc;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "lowquery API"
    ),
    nest(
        (path = "/entities", api = LowQueryApiDoc),
    )
)]
pub struct ApiDoc;
