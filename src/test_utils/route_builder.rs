//! Helpers for running requests
use anyhow::{anyhow, Result};
use axum::Router;
use bytes::Bytes;
use http::{Method, Request, StatusCode, Uri};
use hyper::Body;
use mime::{Mime, APPLICATION_JSON, APPLICATION_WWW_FORM_URLENCODED};
use serde::de::DeserializeOwned;
use tower::ServiceExt;

#[derive(Debug)]
pub(crate) struct RouteBuilder {
    app: Router,
    method: Method,
    path: Uri,
    body: Option<(Option<Mime>, Body)>,
    accept_mime: Option<Mime>,
}

impl RouteBuilder {
    pub(crate) fn new<U>(app: Router, method: Method, path: U) -> Self
    where
        Uri: TryFrom<U>,
        <Uri as TryFrom<U>>::Error: Into<http::Error>,
    {
        Self {
            app,
            method,
            path: TryFrom::try_from(path).map_err(Into::into).unwrap(),
            body: Default::default(),
            accept_mime: Default::default(),
        }
    }

    pub(crate) fn with_form_body(mut self, fields: &[(&str, &str)]) -> Self {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();

        self.body = Some((Some(APPLICATION_WWW_FORM_URLENCODED), Body::from(body)));

        self
    }

    /// Send `body` as is, without a content type.
    pub(crate) fn with_raw_body(mut self, body: &str) -> Self {
        self.body = Some((None, Body::from(body.to_string())));

        self
    }

    pub(crate) async fn into_raw_response(mut self) -> Result<(StatusCode, Bytes)> {
        let request = self.build_request()?;
        let response = self.app.oneshot(request).await?;
        let status = response.status();
        let body = hyper::body::to_bytes(response.into_body()).await?;

        Ok((status, body))
    }

    pub(crate) async fn into_text_response(self) -> Result<(StatusCode, String)> {
        let (status, body) = self.into_raw_response().await?;

        Ok((status, String::from_utf8(body.to_vec())?))
    }

    pub(crate) async fn into_json_response<T>(mut self) -> Result<(StatusCode, T)>
    where
        T: DeserializeOwned,
    {
        self.accept_mime = self.accept_mime.or(Some(APPLICATION_JSON));

        let (status, body) = self.into_raw_response().await?;
        match serde_json::from_slice::<T>(&body) {
            Ok(body) => Ok((status, body)),
            Err(e) => Err(anyhow!(
                "Couldn't parse {}: {e}",
                String::from_utf8_lossy(&body)
            )),
        }
    }

    fn build_request(&mut self) -> Result<Request<Body>> {
        let mut builder = Request::builder()
            .method(self.method.clone())
            .uri(self.path.clone());

        if let Some(mime) = self.accept_mime.take() {
            builder = builder.header(http::header::ACCEPT, mime.as_ref())
        }

        if let Some((mime, body)) = self.body.take() {
            if let Some(mime) = mime {
                builder = builder.header(http::header::CONTENT_TYPE, mime.as_ref());
            }

            Ok(builder.body(body)?)
        } else {
            Ok(builder.body(Body::from(vec![]))?)
        }
    }
}
