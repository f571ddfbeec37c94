use std::io::Write;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossbeam_channel as channel;
use tracing::{debug, info, warn};

use crate::cli::{Serve, SnapshotFormat};
use crate::counter::{Counter, FormattedCounter};
use crate::multivalue::MultiValue;
use crate::registry::Registry;
use crate::rolling::RollingFloat;

const ACCEPT_POLL: Duration = Duration::from_millis(50);

/// Variables the endpoint keeps about itself.
pub struct EndpointStats {
    pub connections: Arc<Counter>,
    pub requests: Arc<FormattedCounter>,
    pub errors: Arc<Counter>,
    pub response_bytes: Arc<RollingFloat>,
    pub handle_micros: Arc<RollingFloat>,
}

impl EndpointStats {
    pub const NAMES: [&'static str; 5] =
        ["connections", "requests", "errors", "response_bytes", "handle_micros"];

    /// Publish all endpoint variables, or none of them if any name is taken.
    pub fn publish(registry: &Registry, window: usize) -> Result<Self> {
        registry.ensure_vacant(&Self::NAMES)?;
        Ok(Self {
            connections: Counter::publish(registry, "connections", 0)?,
            requests: FormattedCounter::publish(registry, "requests", 0)?,
            errors: Counter::publish(registry, "errors", 0)?,
            response_bytes: registry
                .publish("response_bytes", Arc::new(RollingFloat::with_window(window)))?,
            handle_micros: registry
                .publish("handle_micros", Arc::new(RollingFloat::with_window(window)))?,
        })
    }
}

pub fn run_serve(serve: Serve) -> Result<()> {
    let stop_flag = Arc::new(AtomicBool::new(false));
    {
        let stop = stop_flag.clone();
        let _ = ctrlc::set_handler(move || {
            stop.store(true, Ordering::Relaxed);
        });
    }

    run_serve_with_shutdown(serve, Arc::new(Registry::new()), stop_flag)
}

pub fn run_serve_with_shutdown(
    serve: Serve,
    registry: Arc<Registry>,
    stop_flag: Arc<AtomicBool>,
) -> Result<()> {
    let listener = TcpListener::bind(serve.host)
        .with_context(|| format!("Binding TCP listener at {}", serve.host))?;
    serve_on(listener, &serve, registry, stop_flag)
}

/// Accept on `listener` until `stop_flag` is set, writing one registry snapshot to
/// every client.
pub fn serve_on(
    listener: TcpListener,
    serve: &Serve,
    registry: Arc<Registry>,
    stop_flag: Arc<AtomicBool>,
) -> Result<()> {
    let tags: MultiValue = serve.tags.iter().cloned().collect();
    if !tags.is_empty() {
        registry.ensure_vacant(&["tags"])?;
    }
    let stats = Arc::new(EndpointStats::publish(&registry, serve.window)?);
    if !tags.is_empty() {
        registry.publish("tags", Arc::new(tags))?;
    }

    let local = listener.local_addr().context("Reading listener address")?;
    listener
        .set_nonblocking(true)
        .context("Setting TCP listener non-blocking mode")?;
    info!(host = %local, workers = serve.workers, format = ?serve.format, "Serving live variables");

    // Accepted connections -> handler pool
    let (conn_tx, conn_rx) = channel::bounded::<(TcpStream, SocketAddr)>(serve.backlog.max(1));
    let workers: Vec<_> = (0..serve.workers.max(1))
        .map(|_| {
            let conn_rx = conn_rx.clone();
            let registry = Arc::clone(&registry);
            let stats = Arc::clone(&stats);
            let format = serve.format;
            thread::spawn(move || {
                // Ends once the acceptor drops its sender
                while let Ok((stream, addr)) = conn_rx.recv() {
                    if let Err(e) = handle_client(stream, &registry, &stats, format) {
                        stats.errors.add(1);
                        warn!(?e, %addr, "Snapshot write failed");
                    }
                }
            })
        })
        .collect();
    drop(conn_rx);

    while !stop_flag.load(Ordering::Relaxed) {
        match listener.accept() {
            Ok((stream, addr)) => {
                stats.connections.add(1);
                debug!(%addr, "Accepted connection");
                match conn_tx.try_send((stream, addr)) {
                    Ok(()) => {}
                    Err(channel::TrySendError::Full(_)) => {
                        // Handlers saturated: drop the client rather than queue unbounded
                        stats.errors.add(1);
                        warn!(%addr, "Handler queue full, dropping connection");
                    }
                    Err(channel::TrySendError::Disconnected(_)) => break,
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => thread::sleep(ACCEPT_POLL),
            Err(e) => {
                warn!(?e, "Accept failed");
                thread::sleep(ACCEPT_POLL);
            }
        }
    }

    info!("Shutting down");
    drop(conn_tx);
    for worker in workers {
        if worker.join().is_err() {
            warn!("Handler thread panicked");
        }
    }
    Ok(())
}

fn handle_client(
    mut stream: TcpStream,
    registry: &Registry,
    stats: &EndpointStats,
    format: SnapshotFormat,
) -> Result<()> {
    let started = Instant::now();
    // Accepted sockets inherit non-blocking mode on some platforms
    stream
        .set_nonblocking(false)
        .context("Setting client stream blocking mode")?;
    stats.requests.add(1);

    let body = render_snapshot(registry, format);
    stream.write_all(body.as_bytes()).context("Writing snapshot")?;
    stream.flush().context("Flushing snapshot")?;

    stats.response_bytes.add(body.len() as f64);
    stats.handle_micros.add(started.elapsed().as_secs_f64() * 1e6);
    Ok(())
}

pub fn render_snapshot(registry: &Registry, format: SnapshotFormat) -> String {
    match format {
        SnapshotFormat::Json => {
            let mut body = registry.to_json();
            body.push('\n');
            body
        }
        SnapshotFormat::Text => registry.render_text(),
    }
}
