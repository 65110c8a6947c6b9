//! # Dashboard Window
//!
//! eframe application that repaints the instrument cluster on a fixed
//! cadence from whatever the state store currently holds. It never waits
//! for telemetry; a missing snapshot simply renders the defaults.

use eframe::egui::{self, Align2, Color32, FontId, Pos2, RichText, Stroke};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::info;

use super::gauge::{Gauge, Point};
use super::readout::{Dashboard, DashboardView, GaugeReading};
use crate::config::{Config, DisplayConfig};
use crate::error::{DashError, Result};
use crate::shutdown::ShutdownSignal;
use crate::telemetry::{Phase, StateStore};

const BACKGROUND: Color32 = Color32::from_rgb(0x20, 0x20, 0x20);
const DIAL_OUTLINE: Color32 = Color32::from_rgb(0xA0, 0xA0, 0xA0);
const SECONDARY_TEXT: Color32 = Color32::from_rgb(0xB0, 0xB0, 0xB0);
const NEEDLE: Color32 = Color32::RED;

/// Space between and around the dials
const PADDING: f32 = 10.0;

/// Room below the dials for the text readouts
const READOUT_HEIGHT: f32 = 130.0;

/// Wakes the window from another thread.
///
/// eframe may stop calling `update` while the window is minimised, so a
/// shutdown raised elsewhere must also ask for a repaint to be noticed.
#[derive(Clone, Default)]
pub struct RepaintHandle {
    ctx: Arc<OnceLock<egui::Context>>,
}

impl RepaintHandle {
    /// Request a repaint; returns false if the window has not opened yet
    pub fn request_repaint(&self) -> bool {
        match self.ctx.get() {
            Some(ctx) => {
                ctx.request_repaint();
                true
            }
            None => false,
        }
    }

    fn attach(&self, ctx: &egui::Context) {
        let _ = self.ctx.set(ctx.clone());
    }
}

/// The instrument cluster window
pub struct DashboardApp {
    dashboard: Dashboard,
    store: StateStore,
    shutdown: ShutdownSignal,
    frame_period: Duration,
    listen_url: String,
    repaint: RepaintHandle,
}

impl DashboardApp {
    /// # Errors
    ///
    /// Returns error if a gauge configuration is invalid
    pub fn new(config: &Config, store: StateStore, shutdown: ShutdownSignal) -> Result<Self> {
        Ok(Self {
            dashboard: Dashboard::new(&config.gauges)?,
            store,
            shutdown,
            frame_period: Duration::from_millis(config.display.frame_period_ms),
            listen_url: config.server.url(),
            repaint: RepaintHandle::default(),
        })
    }

    /// Handle for waking the window once it is running
    pub fn repaint_handle(&self) -> RepaintHandle {
        self.repaint.clone()
    }

    /// Open the window and block until it is closed.
    ///
    /// Must be called from the main thread.
    ///
    /// # Errors
    ///
    /// Returns error if the window or graphics context cannot be created
    pub fn run(self, display: &DisplayConfig) -> Result<()> {
        let tachometer = gauge_extent(self.dashboard.tachometer());
        let speedometer = gauge_extent(self.dashboard.speedometer());
        let width = tachometer.x + speedometer.x + PADDING * 4.0;
        let height = tachometer.y.max(speedometer.y) + READOUT_HEIGHT;

        let native_options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_title(display.title.as_str())
                .with_inner_size([width, height]),
            ..Default::default()
        };

        eframe::run_native(
            &display.title,
            native_options,
            Box::new(move |cc| {
                self.repaint.attach(&cc.egui_ctx);
                Ok(Box::new(self))
            }),
        )
        .map_err(|e| DashError::Gui(e.to_string()))
    }

    fn draw(&self, ui: &mut egui::Ui, view: &DashboardView) {
        ui.horizontal(|ui| {
            ui.add_space(PADDING);
            draw_gauge(ui, self.dashboard.tachometer(), &view.tachometer);
            ui.add_space(PADDING);
            draw_gauge(ui, self.dashboard.speedometer(), &view.speedometer);
        });

        ui.add_space(PADDING);
        ui.label(readout(&view.position, Color32::WHITE));
        ui.label(readout(&view.in_game_position, SECONDARY_TEXT));
        ui.label(readout(&view.navigation, SECONDARY_TEXT));

        if view.phase == Phase::Idle {
            ui.add_space(PADDING);
            ui.label(
                RichText::new(format!("Waiting for simulator on {}", self.listen_url))
                    .font(FontId::monospace(11.0))
                    .color(DIAL_OUTLINE),
            );
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if ctx.input(|i| i.viewport().close_requested()) && self.shutdown.trigger() {
            info!("Dashboard window closed, shutting down");
        }

        // Shutdown requested elsewhere (Ctrl+C)
        if self.shutdown.is_triggered() {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }

        let (snapshot, phase) = self.store.read_with_phase();
        let view = self.dashboard.view(&snapshot, phase);

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(BACKGROUND).inner_margin(PADDING))
            .show(ctx, |ui| self.draw(ui, &view));

        ctx.request_repaint_after(self.frame_period);
    }
}

fn gauge_extent(gauge: &Gauge) -> egui::Vec2 {
    let center = gauge.spec().center();
    egui::vec2((center.x * 2.0) as f32, (center.y * 2.0) as f32)
}

fn to_screen(origin: Pos2, point: Point) -> Pos2 {
    origin + egui::vec2(point.x as f32, point.y as f32)
}

fn draw_gauge(ui: &mut egui::Ui, gauge: &Gauge, reading: &GaugeReading) {
    let (response, painter) = ui.allocate_painter(gauge_extent(gauge), egui::Sense::hover());
    let origin = response.rect.min;
    let center = to_screen(origin, gauge.spec().center());

    painter.circle(
        center,
        gauge.spec().radius() as f32,
        BACKGROUND,
        Stroke::new(3.0, DIAL_OUTLINE),
    );

    for tick in gauge.ticks() {
        painter.line_segment(
            [to_screen(origin, tick.inner), to_screen(origin, tick.outer)],
            Stroke::new(2.0, Color32::WHITE),
        );
        painter.text(
            to_screen(origin, tick.label_pos),
            Align2::CENTER_CENTER,
            &tick.label,
            FontId::monospace(10.0),
            Color32::WHITE,
        );
    }

    let tip = to_screen(origin, reading.needle.tip);
    painter.arrow(center, tip - center, Stroke::new(4.0, NEEDLE));

    painter.text(
        to_screen(origin, gauge.annotation_pos()),
        Align2::CENTER_CENTER,
        &reading.annotation,
        FontId::monospace(15.0),
        Color32::WHITE,
    );
}

fn readout(text: &str, color: Color32) -> RichText {
    RichText::new(text).font(FontId::monospace(14.0)).color(color)
}
