use std::{net::SocketAddr, sync::Arc, time::Duration};

use desktop_runtime::{ConnectionBanner, DesktopController, DesktopView};
use desktop_sync_client::sync_loop::follow;
use desktop_sync_contract::{window_types, CreateWindowRequest};
use desktop_sync_server::{serve, WindowRegistry};
use pretty_assertions::assert_eq;
use tokio::{
    net::TcpListener,
    runtime::{Builder, Runtime},
    sync::{mpsc, oneshot},
};

/// Serves `registry` on its own runtime; dropping the runtime kills every open socket.
fn start_server(addr: SocketAddr, registry: Arc<WindowRegistry>) -> (Runtime, SocketAddr) {
    let runtime = Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .expect("server runtime");
    let listener = runtime.block_on(TcpListener::bind(addr)).expect("bind");
    let bound = listener.local_addr().expect("addr");
    runtime.spawn(async move {
        serve(listener, registry, &[], std::future::pending())
            .await
            .expect("serve");
    });
    (runtime, bound)
}

fn registry_with(titles: &[&str]) -> Arc<WindowRegistry> {
    let registry = Arc::new(WindowRegistry::default());
    for title in titles {
        registry
            .create(CreateWindowRequest::new(window_types::TEXT_EDITOR, *title))
            .expect("create");
    }
    registry
}

async fn wait_for(
    views: &mut mpsc::UnboundedReceiver<DesktopView>,
    accept: impl Fn(&DesktopView) -> bool,
) -> DesktopView {
    tokio::time::timeout(Duration::from_secs(10), async {
        while let Some(view) = views.recv().await {
            if accept(&view) {
                return view;
            }
        }
        panic!("sync loop stopped");
    })
    .await
    .expect("view within timeout")
}

#[test]
fn follow_reconnects_and_accepts_a_restarted_registry() {
    let client = Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("client runtime");
    let (first, addr) = start_server(
        "127.0.0.1:0".parse().expect("addr"),
        registry_with(&["One", "Two", "Three"]),
    );

    let (views_tx, mut views) = mpsc::unbounded_channel();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let server_url = format!("http://{addr}");
    let follower = client.spawn(async move {
        let mut controller = DesktopController::default();
        follow(
            &server_url,
            &mut controller,
            move |view: &DesktopView| {
                let _ = views_tx.send(view.clone());
            },
            async move {
                let _ = stop_rx.await;
            },
        )
        .await
    });

    let view = client.block_on(wait_for(&mut views, |view| view.windows.len() == 3));
    assert_eq!(view.banner, None);

    drop(first);
    client.block_on(wait_for(&mut views, |view| {
        view.banner == Some(ConnectionBanner::Disconnected)
    }));

    // The restarted registry counts from zero again; its lower version must still be accepted.
    let (second, _) = start_server(addr, registry_with(&["Fresh"]));
    let view = client.block_on(wait_for(&mut views, |view| {
        view.banner.is_none() && view.windows.len() == 1
    }));
    assert_eq!(view.windows[0].title, "Fresh");

    let _ = stop_tx.send(());
    client
        .block_on(follower)
        .expect("follower task")
        .expect("follow result");
    drop(second);
}
