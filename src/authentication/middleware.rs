use std::convert::Infallible;

use warp::{reject::Rejection, Filter};

use crate::error::HttpError;

use super::jwt::{verify_jwt_session, SessionData};

pub fn with_auth() -> impl Filter<Extract = ((),), Error = Rejection> + Copy {
    warp::cookie::<String>("session").and_then(|session: String| async move {
        if verify_jwt_session(session).is_ok() {
            Ok(())
        } else {
            Err(warp::reject::custom(HttpError::Unauthorized.default()))
        }
    })
}

pub fn with_session() -> impl Filter<Extract = (SessionData,), Error = Rejection> + Copy {
    warp::cookie::<String>("session").and_then(|session: String| async move {
        match verify_jwt_session(session) {
            Ok(data) => Ok(SessionData::from(data)),
            Err(_) => Err(warp::reject::custom(HttpError::Unauthorized.default())),
        }
    })
}

pub fn with_possible_session(
) -> impl Filter<Extract = (Option<SessionData>,), Error = Infallible> + Copy {
    warp::filters::cookie::optional::<String>("session").map(|session: Option<String>| {
        session
            .and_then(|session| verify_jwt_session(session).ok())
            .map(SessionData::from)
    })
}
