//! # terrazone-render
//!
//! Figures for a terrain zone analysis:
//!
//! - a zone map, one pixel per raster cell, with the overlay-shaded relief
//!   blended over discrete zone colours, a title, axis labels and a colour
//!   bar labelled with the zone names
//! - a titled bar chart of area per zone with zone-name tick labels
//!
//! Drawing uses `imageproc`; text is set in a bundled DejaVu Sans face.
//!
//! Computing an image and showing it are separate steps. Rendering returns an
//! [`image::RgbImage`]; [`save_png`] writes it and a [`Presenter`] decides
//! whether to display it. [`Headless`] is the default and never opens a
//! window.
//!
//! Colours follow matplotlib's "terrain" colormap, so the zone at table
//! position `i` of `n` gets the colour at `i / (n - 1)`.

mod chart;
mod colormap;
mod error;
mod hillshade;
mod map;
mod output;
mod present;
mod text;

pub use chart::{axis_scale, nice_step, render_area_chart, ChartOptions};
pub use colormap::{terrain_color, ZonePalette};
pub use error::RenderError;
pub use hillshade::{hillshade, overlay, shade_overlay};
pub use map::{render_zone_map, MapOptions};
pub use output::{save_png, world_file_path, write_world_file};
pub use present::{presenter, Headless, Presenter, SystemViewer};

/// Result type for rendering operations.
pub type Result<T> = std::result::Result<T, RenderError>;
