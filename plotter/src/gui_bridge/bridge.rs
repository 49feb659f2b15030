use crate::gui_bridge::model::PublishedState;
use crate::render::RenderedPlot;
use anyhow::{anyhow, Context, Result};
use antcore::AntennaModel;
use std::{
    net::SocketAddr,
    sync::{mpsc, Arc, RwLock},
    thread,
};
use tokio::runtime::Builder;
use warp::{http::StatusCode, reply::Response, Filter, Reply};

type SharedState = Arc<RwLock<PublishedState>>;

fn gui_bind_address(port: u16) -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], port))
}

fn unavailable(message: &str) -> Response {
    warp::reply::with_status(message.to_string(), StatusCode::SERVICE_UNAVAILABLE).into_response()
}

fn not_found(what: &str) -> Response {
    warp::reply::with_status(format!("no {what} published"), StatusCode::NOT_FOUND).into_response()
}

fn routes(state: SharedState) -> impl Filter<Extract = (Response,), Error = warp::Rejection> + Clone {
    let state_filter = warp::any().map(move || state.clone());

    let index_route = warp::path::end()
        .and(warp::get())
        .and(state_filter.clone())
        .map(|state: SharedState| match state.read() {
            Ok(guard) => warp::reply::html(guard.index_page()).into_response(),
            Err(_) => unavailable("bridge state poisoned"),
        });

    let plot_route = warp::path!("plot" / String)
        .and(warp::get())
        .and(state_filter.clone())
        .map(|name: String, state: SharedState| match state.read() {
            Ok(guard) => match guard.page(&name) {
                Some(page) => warp::reply::html(page.to_string()).into_response(),
                None => not_found(&format!("plot \"{name}\"")),
            },
            Err(_) => unavailable("bridge state poisoned"),
        });

    let model_route = warp::path!("model")
        .and(warp::get())
        .and(state_filter)
        .map(|state: SharedState| match state.read() {
            Ok(guard) => match guard.model.as_ref() {
                Some(model) => warp::reply::json(model).into_response(),
                None => not_found("model"),
            },
            Err(_) => unavailable("bridge state poisoned"),
        });

    index_route.or(plot_route).unify().or(model_route).unify()
}

/// Local HTTP server that pushes rendered pages to a browser and the parsed
/// model to remote viewers.
pub struct GuiBridge {
    state: SharedState,
    address: SocketAddr,
}

impl GuiBridge {
    /// Binds `127.0.0.1:<port>` (0 picks a free port) and serves from a
    /// background thread until the process exits.
    pub fn start(port: u16) -> Result<Self> {
        let state = Arc::new(RwLock::new(PublishedState::default()));
        let filter = routes(state.clone());
        let (bound_tx, bound_rx) = mpsc::channel::<Result<SocketAddr>>();

        thread::spawn(move || {
            let runtime = match Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime,
                Err(err) => {
                    let _ = bound_tx.send(Err(anyhow!(err).context("building bridge runtime")));
                    return;
                }
            };
            runtime.block_on(async move {
                match warp::serve(filter).try_bind_ephemeral(gui_bind_address(port)) {
                    Ok((address, server)) => {
                        let _ = bound_tx.send(Ok(address));
                        server.await;
                    }
                    Err(err) => {
                        let _ = bound_tx.send(Err(anyhow!(err).context(format!("binding port {port}"))));
                    }
                }
            });
        });

        let address = bound_rx
            .recv()
            .context("bridge thread exited before binding")??;
        log::info!("serving plots on http://{address}/");
        Ok(Self { state, address })
    }

    pub fn address(&self) -> SocketAddr {
        self.address
    }

    pub fn url(&self) -> String {
        format!("http://{}/", self.address)
    }

    pub fn publish(&self, title: &str, pages: Vec<RenderedPlot>, model: Option<AntennaModel>) -> Result<()> {
        let mut guard = self
            .state
            .write()
            .map_err(|_| anyhow!("bridge state poisoned"))?;
        *guard = PublishedState {
            title: title.to_string(),
            pages,
            model,
            status: None,
        };
        log::info!(
            "published {} page(s){}",
            guard.pages.len(),
            if guard.model.is_some() { " and the model" } else { "" }
        );
        Ok(())
    }

    /// Sets the status line of the index page without touching the pages.
    pub fn publish_status(&self, message: &str) -> Result<()> {
        let mut guard = self
            .state
            .write()
            .map_err(|_| anyhow!("bridge state poisoned"))?;
        guard.status = Some(message.to_string());
        log::info!("[bridge] {message}");
        Ok(())
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> PublishedState {
        self.state
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::pattern::{demo_model, DemoConfig};

    fn state_with(model: Option<AntennaModel>) -> SharedState {
        Arc::new(RwLock::new(PublishedState {
            title: "demo".into(),
            pages: vec![RenderedPlot {
                name: "azimuth".into(),
                content: "<html>azimuth</html>".into(),
            }],
            model,
            status: None,
        }))
    }

    #[tokio::test]
    async fn routes_serve_index_pages_and_model() {
        let model = demo_model(&DemoConfig::default()).unwrap();
        let filter = routes(state_with(Some(model.clone())));

        let index = warp::test::request().path("/").reply(&filter).await;
        assert_eq!(index.status(), StatusCode::OK);
        assert!(String::from_utf8_lossy(index.body()).contains("/plot/azimuth"));

        let page = warp::test::request().path("/plot/azimuth").reply(&filter).await;
        assert_eq!(page.body().as_ref(), b"<html>azimuth</html>");

        let json = warp::test::request().path("/model").reply(&filter).await;
        assert_eq!(json.status(), StatusCode::OK);
        let parsed = AntennaModel::from_json(&String::from_utf8_lossy(json.body())).unwrap();
        assert_eq!(parsed, model);
    }

    #[tokio::test]
    async fn unknown_plot_and_missing_model_are_not_found() {
        let filter = routes(state_with(None));
        let page = warp::test::request().path("/plot/plot3d").reply(&filter).await;
        assert_eq!(page.status(), StatusCode::NOT_FOUND);
        let json = warp::test::request().path("/model").reply(&filter).await;
        assert_eq!(json.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn publish_replaces_state() {
        let bridge = GuiBridge::start(0).unwrap();
        assert_ne!(bridge.address().port(), 0);
        bridge
            .publish(
                "dipole",
                vec![RenderedPlot {
                    name: "plot_smith".into(),
                    content: String::new(),
                }],
                None,
            )
            .unwrap();
        bridge.publish_status("viewer started").unwrap();
        let snapshot = bridge.snapshot();
        assert_eq!(snapshot.title, "dipole");
        assert!(snapshot.page("plot_smith").is_some());
        assert_eq!(snapshot.status.as_deref(), Some("viewer started"));

        bridge.publish("dipole", Vec::new(), None).unwrap();
        assert!(bridge.snapshot().status.is_none());
    }
}
