use crate::services::metrics::get_metrics;
use invoiceme_core::error::AppError;

pub async fn metrics() -> Result<String, AppError> {
    Ok(get_metrics()?)
}
