//! Screen detection: which display rectangle to tile into.
//!
//! Tier 1 enumerates every display through JXA (visible frames, y flipped
//! against the primary display) and picks the one under the frontmost
//! window. Tier 2 asks Finder for the desktop bounds and subtracts the Dock
//! when it is pinned. Dock detection failures never fail the call.

use claude_grid_core::ScreenRect;

use crate::context::ScriptContext;
use crate::error::OsaError;
use crate::executor::{DEFAULT_TIMEOUT, ScriptLanguage, ScriptRunner};

pub const JXA_SCREENS_SCRIPT: &str = r#"ObjC.import("AppKit");
var screens = $.NSScreen.screens;
var primary = screens.objectAtIndex(0).frame;
var pH = primary.size.height;
var result = [];
for (var i = 0; i < screens.count; i++) {
    var v = screens.objectAtIndex(i).visibleFrame;
    var x = Math.round(v.origin.x);
    var y = Math.round(pH - v.origin.y - v.size.height);
    var w = Math.round(v.size.width);
    var h = Math.round(v.size.height);
    result.push(x + "," + y + "," + w + "," + h);
}
result.join(";");"#;

pub const FRONTMOST_POSITION_SCRIPT: &str = r#"tell application "System Events" to get position of window 1 of (first process whose frontmost is true)"#;

pub const DESKTOP_BOUNDS_SCRIPT: &str =
    r#"tell application "Finder" to get bounds of window of desktop"#;

pub const DOCK_AUTOHIDE_SCRIPT: &str =
    r#"tell application "System Events" to get autohide of dock preferences"#;

pub const DOCK_FRAME_SCRIPT: &str =
    r#"tell application "System Events" to tell process "Dock" to get {position, size} of list 1"#;

/// Screen edge the Dock is pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DockEdge {
    Bottom,
    Top,
    Left,
    Right,
}

impl DockEdge {
    /// Infer the edge from the Dock's frame. A horizontal Dock sits at the
    /// bottom when its y is below its own height; a vertical one sits on the
    /// left when its x is within its own width. Returns the edge and the
    /// Dock's thickness across it.
    pub fn infer(x: i32, y: i32, width: i32, height: i32) -> (Self, i32) {
        if width > height {
            if y > height {
                (Self::Bottom, height)
            } else {
                (Self::Top, height)
            }
        } else if x < width {
            (Self::Left, width)
        } else {
            (Self::Right, width)
        }
    }

    /// Shrink `rect` by `thickness` on this edge.
    pub fn subtract(self, rect: ScreenRect, thickness: i32) -> ScreenRect {
        match self {
            Self::Bottom => ScreenRect {
                height: rect.height - thickness,
                ..rect
            },
            Self::Top => ScreenRect {
                y: rect.y + thickness,
                height: rect.height - thickness,
                ..rect
            },
            Self::Left => ScreenRect {
                x: rect.x + thickness,
                width: rect.width - thickness,
                ..rect
            },
            Self::Right => ScreenRect {
                width: rect.width - thickness,
                ..rect
            },
        }
    }
}

pub struct ScreenLocator<R> {
    runner: R,
}

impl<R: ScriptRunner> ScreenLocator<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    /// Detect the usable rectangle of the display under the frontmost
    /// window. Errors only when both tiers fail, or on cancellation.
    pub async fn detect(&self, ctx: &ScriptContext) -> Result<ScreenRect, OsaError> {
        ctx.check()?;
        let ctx = match ctx.deadline() {
            Some(_) => ctx.clone(),
            None => ctx.with_timeout(DEFAULT_TIMEOUT),
        };

        let screens = match self.all_screens(&ctx).await {
            Ok(screens) => screens,
            Err(e) if e.is_context() => return Err(e),
            Err(e) => {
                tracing::debug!("display enumeration failed, using desktop bounds: {e}");
                return self.detect_fallback(&ctx).await;
            }
        };

        if screens.len() == 1 {
            return Ok(screens[0]);
        }

        match self.frontmost_position(&ctx).await {
            Ok((x, y)) => Ok(screen_containing(&screens, x, y)),
            Err(e) if e.is_context() => Err(e),
            Err(e) => {
                tracing::debug!("frontmost window lookup failed, using first display: {e}");
                Ok(screens[0])
            }
        }
    }

    async fn all_screens(&self, ctx: &ScriptContext) -> Result<Vec<ScreenRect>, OsaError> {
        let output = self
            .runner
            .run(ctx, ScriptLanguage::JavaScript, JXA_SCREENS_SCRIPT)
            .await?;
        parse_screen_list(&output)
    }

    async fn frontmost_position(&self, ctx: &ScriptContext) -> Result<(i32, i32), OsaError> {
        let output = self
            .runner
            .run_applescript(ctx, FRONTMOST_POSITION_SCRIPT)
            .await?;
        let [x, y] = parse_ints::<2>(&output)?;
        Ok((x, y))
    }

    async fn detect_fallback(&self, ctx: &ScriptContext) -> Result<ScreenRect, OsaError> {
        let output = self
            .runner
            .run_applescript(ctx, DESKTOP_BOUNDS_SCRIPT)
            .await?;
        let desktop = parse_ltrb(&output)?;

        match self.dock(ctx).await {
            Ok(Some((edge, thickness))) => {
                tracing::debug!("dock pinned to {edge:?}, {thickness}px");
                Ok(edge.subtract(desktop, thickness))
            }
            Ok(None) => Ok(desktop),
            Err(e) if e.is_context() => Err(e),
            Err(e) => {
                tracing::debug!("dock detection failed, using full desktop: {e}");
                Ok(desktop)
            }
        }
    }

    /// `None` when the Dock auto-hides.
    async fn dock(&self, ctx: &ScriptContext) -> Result<Option<(DockEdge, i32)>, OsaError> {
        let autohide = self
            .runner
            .run_applescript(ctx, DOCK_AUTOHIDE_SCRIPT)
            .await?;
        if autohide.trim().eq_ignore_ascii_case("true") {
            return Ok(None);
        }

        let frame = self.runner.run_applescript(ctx, DOCK_FRAME_SCRIPT).await?;
        let [x, y, w, h] = parse_ints::<4>(&frame)?;
        Ok(Some(DockEdge::infer(x, y, w, h)))
    }
}

/// First screen containing `(x, y)`, else the first screen.
/// `screens` must be non-empty.
pub fn screen_containing(screens: &[ScreenRect], x: i32, y: i32) -> ScreenRect {
    screens
        .iter()
        .find(|s| s.contains(x, y))
        .copied()
        .unwrap_or(screens[0])
}

/// Parse `x,y,w,h;x,y,w,h;...`.
pub fn parse_screen_list(output: &str) -> Result<Vec<ScreenRect>, OsaError> {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        return Err(OsaError::parse(output, "empty screen output"));
    }
    trimmed
        .split(';')
        .map(|entry| {
            let [x, y, w, h] = parse_ints::<4>(entry)?;
            Ok(ScreenRect::new(x, y, w, h))
        })
        .collect()
}

/// Parse Finder's `left, top, right, bottom`.
pub fn parse_ltrb(output: &str) -> Result<ScreenRect, OsaError> {
    let [left, top, right, bottom] = parse_ints::<4>(output)?;
    Ok(ScreenRect::new(left, top, right - left, bottom - top))
}

fn parse_ints<const N: usize>(output: &str) -> Result<[i32; N], OsaError> {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        return Err(OsaError::parse(output, "empty response"));
    }
    let parts: Vec<&str> = trimmed.split(',').collect();
    if parts.len() != N {
        return Err(OsaError::parse(
            output,
            format!("expected {N} values, got {}", parts.len()),
        ));
    }
    let mut values = [0i32; N];
    for (i, part) in parts.iter().enumerate() {
        values[i] = part
            .trim()
            .parse()
            .map_err(|_| OsaError::parse(output, format!("invalid value at position {i}")))?;
    }
    Ok(values)
}
