//! Reading and writing the line-based region file.
//!
//! ```text
//! [StaticRegion a_britain]
//! name="Britain"
//! p=1000,1000,0,0
//! parent=(a_world)
//! triggergroup=t_city
//! rect=900,900,1200,1200
//! ```
//!
//! Keys are case-insensitive, `//` starts a comment line and `[EOF]` ends
//! the file early. Loading only registers the regions; call
//! [`WorldIndex::finish_loading`] once every file is read.

use super::{RegionId, DYNAMIC_REGION_NAME};
use crate::error::{Result, WorldError};
use crate::rect::Rectangle;
use crate::types::Point4D;
use crate::world::WorldIndex;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, error, info};

const STATIC_SECTION: &str = "StaticRegion";

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// `(a_world)`, `#a_world` and `a_world` all name the same region.
fn parent_reference(value: &str) -> &str {
    let value = value.trim();
    let value = value
        .strip_prefix('(')
        .and_then(|v| v.strip_suffix(')'))
        .unwrap_or(value);
    value.trim_start_matches('#').trim()
}

impl WorldIndex {
    /// Registers every region defined in `text`.
    ///
    /// `file` is only used in error messages. On error the region subsystem
    /// is cleared, as a partial hierarchy cannot be resolved.
    pub fn load_regions_str(&mut self, text: &str, file: &str) -> Result<Vec<RegionId>> {
        match self.parse_regions(text, file) {
            Ok(loaded) => {
                debug!("Read {} regions from {file}", loaded.len());
                Ok(loaded)
            }
            Err(e) => {
                error!("❌ Regions not used: {e}");
                self.clear_regions();
                Err(e)
            }
        }
    }

    /// Reads a region file from disk, see [`WorldIndex::load_regions_str`].
    pub fn load_region_file(&mut self, path: &Path) -> Result<Vec<RegionId>> {
        let text = std::fs::read_to_string(path)?;
        self.load_regions_str(&text, &path.display().to_string())
    }

    fn parse_regions(&mut self, text: &str, file: &str) -> Result<Vec<RegionId>> {
        let mut loaded = Vec::new();
        let mut current: Option<RegionId> = None;
        let mut explicit_plane = HashSet::new();

        for (index, raw) in text.lines().enumerate() {
            let line_no = index + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with("//") {
                continue;
            }

            if let Some(header) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                let mut parts = header.split_whitespace();
                let section = parts.next().unwrap_or_default();
                if section.eq_ignore_ascii_case("eof") {
                    break;
                }
                if section.eq_ignore_ascii_case(DYNAMIC_REGION_NAME) {
                    return Err(WorldError::DynamicRegionPersistence);
                }
                if !section.eq_ignore_ascii_case(STATIC_SECTION) {
                    return Err(WorldError::parse(
                        file,
                        line_no,
                        format!("unknown section '{section}'"),
                    ));
                }
                let Some(defname) = parts.next() else {
                    return Err(WorldError::parse(file, line_no, "region without defname"));
                };
                let id = self.register_static_region(defname)?;
                loaded.push(id);
                current = Some(id);
                continue;
            }

            let Some(id) = current else {
                return Err(WorldError::parse(file, line_no, "value outside of a region section"));
            };
            let Some((key, value)) = line.split_once('=') else {
                return Err(WorldError::parse(
                    file,
                    line_no,
                    format!("expected key=value, got '{line}'"),
                ));
            };
            let key = key.trim();
            if key.eq_ignore_ascii_case("mapplane") {
                explicit_plane.insert(id);
            }
            self.load_region_line(id, key, value.trim(), file, line_no)?;
        }

        // without an explicit mapplane a region lives where its spawn point is
        for &id in &loaded {
            if explicit_plane.contains(&id) {
                continue;
            }
            if let Some(region) = self.region_mut(id) {
                if let Some(p) = region.spawn_point {
                    region.plane = p.plane;
                }
            }
        }
        Ok(loaded)
    }

    /// Applies one `key=value` line to a region.
    ///
    /// # Errors
    ///
    /// [`WorldError::DynamicRegionPersistence`] for dynamic regions and
    /// [`WorldError::Parse`] for values that do not parse.
    pub fn load_region_line(
        &mut self,
        id: RegionId,
        key: &str,
        value: &str,
        file: &str,
        line: usize,
    ) -> Result<()> {
        let region = self.require_region_mut(id)?;
        if region.is_dynamic() {
            return Err(WorldError::DynamicRegionPersistence);
        }
        let parse_error = |message: String| WorldError::parse(file, line, message);

        match key.to_lowercase().as_str() {
            "category" | "subsection" | "description" => {}
            "name" => {
                if let Some(data) = region.static_data_mut() {
                    data.name = unquote(value).to_string();
                }
            }
            "event" | "events" | "type" | "triggergroup" | "resources" => {
                region.trigger_groups.push(value.to_string());
            }
            "rect" | "rectangle" => {
                let rect: Rectangle = value
                    .parse()
                    .map_err(|e| parse_error(format!("unrecognized rectangle '{value}': {e}")))?;
                region.rectangles.push(rect);
            }
            "p" | "spawnpoint" => {
                let point: Point4D = value
                    .parse()
                    .map_err(|e| parse_error(format!("invalid point '{value}': {e}")))?;
                region.spawn_point = Some(point);
            }
            "mapplane" => {
                region.plane = value
                    .parse()
                    .map_err(|_| parse_error(format!("invalid mapplane '{value}'")))?;
            }
            "parent" => {
                if let Some(data) = region.static_data_mut() {
                    data.parent_defname = Some(parent_reference(value).to_string());
                }
            }
            "createdat" => {
                if let Some(data) = region.static_data_mut() {
                    data.created_at = Some(value.to_string());
                }
            }
            other => {
                if let Some(data) = region.static_data_mut() {
                    data.tags.push((other.to_string(), value.to_string()));
                }
            }
        }
        Ok(())
    }

    /// Appends the section of one static region to `out`.
    pub fn save_region(&self, id: RegionId, out: &mut String) -> Result<()> {
        let region = self.require_region(id)?;
        let Some(data) = region.static_data() else {
            return Err(WorldError::DynamicRegionPersistence);
        };

        out.push_str(&format!("[{STATIC_SECTION} {}]\n", data.defname));
        if !data.name.is_empty() {
            out.push_str(&format!("name=\"{}\"\n", data.name));
        }
        if let Some(p) = region.spawn_point {
            out.push_str(&format!("p={p}\n"));
        }
        if let Some(created_at) = &data.created_at {
            out.push_str(&format!("createdat={created_at}\n"));
        }
        if region.plane != 0 {
            out.push_str(&format!("mapplane={}\n", region.plane));
        }
        let parent = region
            .parent
            .and_then(|p| self.region(p))
            .and_then(|p| p.defname())
            .or(data.parent_defname.as_deref());
        if let Some(parent) = parent {
            out.push_str(&format!("parent=({parent})\n"));
        }
        for group in &region.trigger_groups {
            out.push_str(&format!("triggergroup={group}\n"));
        }
        for (key, value) in &data.tags {
            out.push_str(&format!("{key}={value}\n"));
        }
        for rect in &region.rectangles {
            out.push_str(&format!("rect={rect}\n"));
        }
        out.push('\n');
        Ok(())
    }

    /// Every static region, in creation order.
    pub fn save_regions(&self) -> String {
        let mut out = String::from("// Static Regions\n\n");
        let mut saved = 0;
        for region in self.static_regions() {
            if self.save_region(region.id(), &mut out).is_ok() {
                saved += 1;
            }
        }
        out.push_str("[EOF]\n");
        debug!("Saved {saved} static regions");
        out
    }

    pub fn save_region_file(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.save_regions())?;
        info!("💾 Regions saved to {}", path.display());
        Ok(())
    }
}
