use std::f64::consts::PI;

use egui::{Color32, Image, Rect, Response, Sense, Stroke, Ui, UiBuilder, Vec2};

pub(crate) const MAP_ZOOM: u32 = 16;
pub(crate) const TILE_SIZE: f32 = 256.;
const MAX_LATITUDE: f64 = 85.051_128_78;
const MARKER_RADIUS: f32 = 6.;

/// A slippy-map tile plus the pixel position of a location inside it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct MapTile {
    pub(crate) zoom: u32,
    pub(crate) x: u32,
    pub(crate) y: u32,
    pub(crate) offset: Vec2,
}

impl MapTile {
    pub(crate) fn for_location(latitude: f64, longitude: f64, zoom: u32) -> Self {
        let n = f64::from(1u32 << zoom);
        let lat_rad = latitude.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
        let x = (longitude.clamp(-180., 180.) + 180.) / 360. * n;
        let y = (1. - (lat_rad.tan() + 1. / lat_rad.cos()).ln() / PI) / 2. * n;

        let tile_x = x.floor().clamp(0., n - 1.);
        let tile_y = y.floor().clamp(0., n - 1.);
        Self {
            zoom,
            x: tile_x as u32,
            y: tile_y as u32,
            offset: Vec2::new(
                ((x - tile_x) * f64::from(TILE_SIZE)) as f32,
                ((y - tile_y) * f64::from(TILE_SIZE)) as f32,
            ),
        }
    }

    /// Tile `dx` columns and `dy` rows away. Columns wrap around the antimeridian,
    /// rows past the poles do not exist.
    pub(crate) fn neighbour(&self, dx: i32, dy: i32) -> Option<Self> {
        let n = 1i64 << self.zoom;
        let y = i64::from(self.y) + i64::from(dy);
        if y < 0 || y >= n {
            return None;
        }
        let x = (i64::from(self.x) + i64::from(dx)).rem_euclid(n);
        Some(Self {
            zoom: self.zoom,
            x: x as u32,
            y: y as u32,
            offset: self.offset,
        })
    }

    pub(crate) fn url(&self) -> String {
        format!(
            "https://tile.openstreetmap.org/{}/{}/{}.png",
            self.zoom, self.x, self.y
        )
    }
}

/// Paints OpenStreetMap tiles centred on the location with a marker on top.
pub(crate) fn show_map(ui: &mut Ui, latitude: f64, longitude: f64, size: Vec2) -> Response {
    let (rect, response) = ui.allocate_exact_size(size, Sense::hover());
    let centre = MapTile::for_location(latitude, longitude, MAP_ZOOM);

    let mut tiles_ui = ui.new_child(UiBuilder::new().max_rect(rect));
    tiles_ui.set_clip_rect(rect.intersect(ui.clip_rect()));
    tiles_ui
        .painter()
        .rect_filled(rect, 0., Color32::from_gray(40));

    let reach_x = (size.x / TILE_SIZE).ceil() as i32;
    let reach_y = (size.y / TILE_SIZE).ceil() as i32;
    for dy in -reach_y..=reach_y {
        for dx in -reach_x..=reach_x {
            let Some(tile) = centre.neighbour(dx, dy) else {
                continue;
            };
            let min = rect.center() - centre.offset
                + Vec2::new(dx as f32 * TILE_SIZE, dy as f32 * TILE_SIZE);
            let tile_rect = Rect::from_min_size(min, Vec2::splat(TILE_SIZE));
            if tile_rect.intersects(rect) {
                Image::from_uri(tile.url()).paint_at(&tiles_ui, tile_rect);
            }
        }
    }

    tiles_ui.painter().circle(
        rect.center(),
        MARKER_RADIUS,
        Color32::RED,
        Stroke::new(2., Color32::WHITE),
    );
    response
}
