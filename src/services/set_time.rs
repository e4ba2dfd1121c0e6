use chrono::{DateTime, Utc};
use tonic::{Request, Response, Status};
use crate::{grpc::{common, internal}, utils::{context::ServiceContext, errors::ErrorCode}};

///
/// Fix the service clock so expiry can be tested without waiting an hour.
///
pub async fn set_time(ctx: &ServiceContext, request: Request<internal::NewTime>)
    -> Result<Response<common::Empty>, Status> {

    let request = request.into_inner();
    let parsed = match DateTime::parse_from_rfc3339(&request.new_time) {
        Ok(parsed) => parsed.with_timezone(&Utc),
        Err(err) => return Err(Status::from(ErrorCode::InvalidTime
            .with_msg(&format!("Could not parse datetime: {}", err)))),
    };

    ctx.set_now(Some(parsed));
    tracing::info!("TimeProvider fixed to {:?}", parsed);
    Ok(Response::new(common::Empty::default()))
}


pub async fn reset_time(ctx: &ServiceContext, _request: Request<common::Empty>)
    -> Result<Response<common::Empty>, Status> {

    ctx.set_now(None);
    tracing::info!("TimeProvider no-longer fixed");
    Ok(Response::new(common::Empty::default()))
}
