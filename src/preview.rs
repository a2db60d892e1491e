//! Live CDN previews shown next to each resolution checkbox.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, channel};

use egui::{ColorImage, TextureHandle, TextureOptions};

use crate::export::ImageFetcher;

pub enum PreviewState {
    Loading,
    Ready(TextureHandle),
    Failed(String),
}

type Loaded = (String, Result<ColorImage, String>);

/// Texture cache keyed by URL. Each URL is fetched at most once.
pub struct PreviewCache {
    fetcher: Arc<dyn ImageFetcher>,
    entries: HashMap<String, PreviewState>,
    tx: Sender<Loaded>,
    rx: Receiver<Loaded>,
}

impl PreviewCache {
    pub fn new(fetcher: Arc<dyn ImageFetcher>) -> Self {
        let (tx, rx) = channel();
        Self {
            fetcher,
            entries: HashMap::new(),
            tx,
            rx,
        }
    }

    /// Current state of `url`, starting a download the first time it is asked for.
    pub fn get(&mut self, ctx: &egui::Context, url: &str) -> &PreviewState {
        if !self.entries.contains_key(url) {
            self.start(ctx, url);
        }
        self.entries.entry(url.to_owned()).or_insert(PreviewState::Loading)
    }

    fn start(&mut self, ctx: &egui::Context, url: &str) {
        self.entries.insert(url.to_owned(), PreviewState::Loading);

        let fetcher = Arc::clone(&self.fetcher);
        let tx = self.tx.clone();
        let ctx = ctx.clone();
        let url = url.to_owned();
        crate::task::spawn(async move {
            let decoded = match fetcher.fetch(&url).await {
                Ok(bytes) => decode(&bytes),
                Err(err) => Err(err.to_string()),
            };
            if tx.send((url, decoded)).is_ok() {
                ctx.request_repaint();
            }
        });
    }

    /// Drops every preview derived from the CDN base url of one file.
    pub fn forget_file(&mut self, cdn_url: &str) {
        let prefix = format!("{}/", cdn_url.trim_end_matches('/'));
        self.entries.retain(|url, _| !url.starts_with(&prefix));
    }

    /// Uploads finished downloads as textures. Call once per frame.
    ///
    /// Results for urls that were forgotten in the meantime are discarded.
    pub fn poll(&mut self, ctx: &egui::Context) {
        while let Ok((url, decoded)) = self.rx.try_recv() {
            if !self.entries.contains_key(&url) {
                continue;
            }
            let state = match decoded {
                Ok(image) => PreviewState::Ready(ctx.load_texture(&url, image, TextureOptions::LINEAR)),
                Err(err) => {
                    log::warn!("Preview failed for {url}: {err}");
                    PreviewState::Failed(err)
                }
            };
            self.entries.insert(url, state);
        }
    }
}

fn decode(bytes: &[u8]) -> Result<ColorImage, String> {
    let image = image::load_from_memory(bytes).map_err(|e| e.to_string())?.to_rgba8();
    let (w, h) = image.dimensions();
    Ok(ColorImage::from_rgba_unmultiplied(
        [w as usize, h as usize],
        image.as_raw(),
    ))
}
