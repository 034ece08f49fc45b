//! HTTP inbound adapter exposing REST endpoints.

pub mod details;
pub mod error;
pub mod health;
pub mod highways;
pub mod reference_data;
pub mod reports;
pub mod segments;
pub mod session;
pub mod session_config;
pub mod state;
pub mod sweeps;
#[cfg(test)]
pub mod test_utils;
pub mod users;
mod validation;

use actix_web::web;

pub use error::ApiResult;

/// Register every `/api/v1` handler on a scope.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use corridor::inbound::http::api_services;
///
/// let app = App::new().service(web::scope("/api/v1").configure(api_services));
/// ```
pub fn api_services(cfg: &mut web::ServiceConfig) {
    cfg.service(users::login)
        .service(users::logout)
        .service(users::current_user)
        .service(users::create_user)
        .service(users::update_user)
        .service(highways::list_highways)
        .service(highways::create_highway)
        .service(highways::get_highway)
        .service(highways::rename_highway)
        .service(highways::list_highway_segments)
        .service(reference_data::list_offices)
        .service(reference_data::create_office)
        .service(reference_data::list_configuration_types)
        .service(reference_data::create_configuration_type)
        .service(segments::list_segments)
        .service(segments::create_segment)
        .service(segments::get_segment)
        .service(segments::update_segment)
        .service(segments::delete_segment)
        .service(segments::list_segment_details)
        .service(details::create_detail)
        .service(details::get_detail)
        .service(details::update_detail)
        .service(details::delete_detail)
        .service(sweeps::overlapping_segments)
        .service(sweeps::overlapping_details)
        .service(sweeps::out_of_bounds_details)
        .service(sweeps::chainage_gaps)
        .service(reports::highway_configurations)
        .service(reports::office_workload)
        .service(reports::configuration_statistics)
        .service(reports::configuration_details)
        .service(reports::user_activity);
}
