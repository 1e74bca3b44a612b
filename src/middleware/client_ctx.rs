use crate::auth::{authenticate_token, parse_authorization};
use crate::error::ApiError;
use crate::orm::users;
use actix_web::body::EitherBody;
use actix_web::dev::{self, Extensions, Payload, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header;
use actix_web::{web::Data, Error, FromRequest, HttpMessage, HttpRequest};
use futures::future::{ready, LocalBoxFuture, Ready};
use sea_orm::DatabaseConnection;
use std::rc::Rc;

/// Client data stored for a single request cycle.
#[derive(Clone, Debug, Default)]
pub struct ClientCtxInner {
    /// User data. None is an anonymous client.
    pub client: Option<users::Model>,
}

impl ClientCtxInner {
    /// Authenticates the `Authorization` header value, if any.
    ///
    /// A header that is present but unusable is an error rather than a guest.
    pub async fn from_header(
        db: &DatabaseConnection,
        authorization: Option<&str>,
    ) -> Result<Self, ApiError> {
        let authorization = match authorization {
            Some(value) => value,
            None => return Ok(Self::default()),
        };

        let key = parse_authorization(authorization)
            .ok_or_else(|| ApiError::Unauthorized("Invalid token header.".to_owned()))?;
        let client = authenticate_token(db, key)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Invalid token.".to_owned()))?;

        Ok(ClientCtxInner {
            client: Some(client),
        })
    }
}

/// Client context passed to routes.
/// Wraps ClientCtxInner, which is set at the beginning of the request.
#[derive(Clone, Debug)]
pub struct ClientCtx(Data<ClientCtxInner>);

impl Default for ClientCtx {
    fn default() -> Self {
        Self(Data::new(ClientCtxInner::default()))
    }
}

impl ClientCtx {
    pub fn get_or_default_from_extensions(extensions: &mut Extensions) -> Self {
        match extensions.get::<Data<ClientCtxInner>>() {
            Some(cbox) => Self(cbox.clone()),
            None => {
                let cbox = Data::new(ClientCtxInner::default());
                extensions.insert(cbox.clone());
                Self(cbox)
            }
        }
    }

    /// Returns either the user's id or None.
    pub fn get_id(&self) -> Option<i32> {
        self.0.client.as_ref().map(|u| u.id)
    }

    pub fn get_user(&self) -> Option<&users::Model> {
        self.0.client.as_ref()
    }

    /// Require user to be logged in. Returns the user or 401.
    pub fn require_user(&self) -> Result<&users::Model, ApiError> {
        self.get_user().ok_or_else(ApiError::unauthenticated)
    }

    /// Require user to be logged in. Returns user_id or 401.
    pub fn require_login(&self) -> Result<i32, ApiError> {
        self.require_user().map(|u| u.id)
    }
}

/// Provides `client: ClientCtx` in the parameters of route functions.
impl FromRequest for ClientCtx {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(ClientCtx::get_or_default_from_extensions(
            &mut req.extensions_mut(),
        )))
    }
}

impl<S: 'static, B> Transform<S, ServiceRequest> for ClientCtx
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = ClientCtxMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ClientCtxMiddleware {
            service: Rc::new(service),
        }))
    }
}

/// Client context middleware
pub struct ClientCtxMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for ClientCtxMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    dev::forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let svc = self.service.clone();

        let authorization = req
            .headers()
            .get(header::AUTHORIZATION)
            .map(|value| value.to_str().map(str::to_owned));

        Box::pin(async move {
            // Without a database there is no client to resolve; requests stay anonymous.
            if let Some(db) = req.app_data::<Data<DatabaseConnection>>().cloned() {
                let authorized = match authorization {
                    Some(Ok(value)) => ClientCtxInner::from_header(&db, Some(value.as_str())).await,
                    Some(Err(_)) => Err(ApiError::Unauthorized("Invalid token header.".to_owned())),
                    None => Ok(ClientCtxInner::default()),
                };

                match authorized {
                    Ok(inner) => {
                        if let Some(user) = &inner.client {
                            log::debug!("authenticated user_id={}", user.id);
                        }
                        req.extensions_mut().insert(Data::new(inner));
                    }
                    Err(err) => {
                        return Ok(req.error_response(err).map_into_right_body());
                    }
                }
            }

            svc.call(req).await.map(ServiceResponse::map_into_left_body)
        })
    }
}
