//! Resolving GIDs against tileset bindings and moving tile data between GID layouts

use isomap_core::{extract_gid, TilesetRef, FLAG_MASK, GID_MASK};

/// A GID resolved to its tileset binding and local tile id
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedGid<'a> {
    pub tileset_ref: &'a TilesetRef,
    pub local_id: u32,
}

/// Resolve a GID (without flip flags) to the binding with the highest
/// `first_gid <= gid`.
///
/// `refs` must be sorted ascending by `first_gid`. Returns `None` for the
/// empty cell (0) and for GIDs below every binding.
pub fn resolve_gid(gid: u32, refs: &[TilesetRef]) -> Option<ResolvedGid<'_>> {
    if gid == 0 {
        return None;
    }
    let mut found = None;
    for tileset_ref in refs {
        if tileset_ref.first_gid <= gid {
            found = Some(tileset_ref);
        } else {
            break;
        }
    }
    found.map(|tileset_ref| ResolvedGid {
        tileset_ref,
        local_id: gid - tileset_ref.first_gid,
    })
}

/// Rewrite raw cell values from one binding layout to another.
///
/// Tilesets are matched by id, flip flags are carried over, and cells whose
/// tileset is missing from either layout become 0. So do cells whose new GID
/// would not fit in the 29 GID bits.
pub fn remap_tile_data(data: &[u32], from: &[TilesetRef], to: &[TilesetRef]) -> Vec<u32> {
    let mut dropped = 0usize;
    let remapped = data
        .iter()
        .map(|&raw| {
            if raw == 0 {
                return 0;
            }
            let flags = raw & FLAG_MASK;
            let value = resolve_gid(extract_gid(raw), from).and_then(|resolved| {
                to.iter()
                    .find(|r| r.tileset.id == resolved.tileset_ref.tileset.id)
                    .and_then(|target| target.first_gid.checked_add(resolved.local_id))
                    .filter(|&gid| gid <= GID_MASK)
                    .map(|gid| gid | flags)
            });
            value.unwrap_or_else(|| {
                dropped += 1;
                0
            })
        })
        .collect();

    if dropped > 0 {
        tracing::debug!("Remap dropped {} cells with no target tileset or an out-of-range GID", dropped);
    }
    remapped
}

#[cfg(test)]
mod tests {
    use super::*;
    use isomap_core::{
        compose_gid, FlipFlags, IdGenerator, Size, Tileset, TilesetOptions, FLIP_HORIZONTAL,
    };

    fn tileset(ids: &mut IdGenerator, name: &str, count: u32) -> Tileset {
        let mut tileset = Tileset::new(
            ids,
            TilesetOptions {
                name: name.to_string(),
                image_source: format!("{name}.png"),
                image_size: Size::new(32 * count, 32),
                tile_size: Size::new(32, 32),
                ..Default::default()
            },
        );
        tileset.tile_count = count;
        tileset
    }

    fn refs() -> Vec<TilesetRef> {
        let mut ids = IdGenerator::with_session("g");
        vec![
            TilesetRef::new(1, tileset(&mut ids, "a", 10)),
            TilesetRef::new(11, tileset(&mut ids, "b", 20)),
        ]
    }

    #[test]
    fn test_resolve_boundaries() {
        let refs = refs();
        assert!(resolve_gid(0, &refs).is_none());

        let cases = [(1, "a", 0), (10, "a", 9), (11, "b", 0), (15, "b", 4)];
        for (gid, name, local) in cases {
            let resolved = resolve_gid(gid, &refs).unwrap();
            assert_eq!(resolved.tileset_ref.tileset.name, name, "gid {gid}");
            assert_eq!(resolved.local_id, local, "gid {gid}");
        }
    }

    #[test]
    fn test_resolve_below_first_binding() {
        let mut refs = refs();
        refs[0].first_gid = 5;
        assert!(resolve_gid(3, &refs).is_none());
    }

    #[test]
    fn test_remap_preserves_flip_flags() {
        let from = refs();
        let mut to = vec![from[0].clone()];
        to[0].first_gid = 50;

        let data = [compose_gid(1, FlipFlags::horizontal())];
        assert_eq!(remap_tile_data(&data, &from, &to), vec![50 | FLIP_HORIZONTAL]);
    }

    #[test]
    fn test_remap_matches_by_tileset_identity() {
        let from = refs();
        // Target layout swaps the order of the two tilesets
        let to = vec![
            TilesetRef::new(1, from[1].tileset.clone()),
            TilesetRef::new(21, from[0].tileset.clone()),
        ];
        let data = [0, 3, 12, 30];
        assert_eq!(remap_tile_data(&data, &from, &to), vec![0, 23, 2, 20]);
    }

    #[test]
    fn test_remap_drops_unmatched_cells() {
        let from = refs();
        let to = vec![from[0].clone()];
        let data = vec![2, 12];
        let out = remap_tile_data(&data, &from, &to);
        assert_eq!(out, vec![2, 0]);
        // input untouched
        assert_eq!(data, vec![2, 12]);
    }

    #[test]
    fn test_remap_drops_out_of_range_gids() {
        let from = refs();
        let mut overflowing = vec![from[0].clone()];
        overflowing[0].first_gid = u32::MAX - 1;
        assert_eq!(remap_tile_data(&[10], &from, &overflowing), vec![0]);

        // Fits in u32 but would spill into the flip bits
        let mut past_mask = vec![from[0].clone()];
        past_mask[0].first_gid = GID_MASK;
        let data = [compose_gid(1, FlipFlags::horizontal()), 2];
        assert_eq!(
            remap_tile_data(&data, &from, &past_mask),
            vec![GID_MASK | FLIP_HORIZONTAL, 0]
        );
    }
}
