//! Display-name map between internal keys and user-visible names.
//!
//! Rebuilt from the world's ordered collections whenever composition
//! changes, so names are a pure function of creation order:
//!
//! | Object | Display name |
//! |--------|--------------|
//! | colored primitive | `red_box`, `blue_mug`, `blue_mug1` |
//! | uncolored lidded box | `lid_box_<i>` |
//! | asset | its asset name, `bowl`, `bowl1` |
//! | drawer | `<cabinet>/<drawer>` |
//! | anything else | its internal key |

use desk_types::{ObjectId, ObjectKind};
use hashbrown::HashMap;

use crate::world::World;

/// Bidirectional key/name lookup.
#[derive(Debug, Clone, Default)]
pub struct NameMap {
    by_key: HashMap<ObjectId, String>,
    by_name: HashMap<String, ObjectId>,
    composition: u64,
}

impl NameMap {
    /// Build the map for the world's current objects.
    #[must_use]
    pub fn build(world: &World) -> Self {
        let mut map = Self {
            composition: world.composition(),
            ..Self::default()
        };
        let mut counters: HashMap<String, usize> = HashMap::new();
        let mut lidded = 0_usize;

        for object in world.objects().filter(|o| o.kind != ObjectKind::Drawer) {
            let base = match (object.kind, object.color, object.label.as_deref()) {
                (ObjectKind::LiddedBox, None, _) => {
                    let name = format!("lid_box_{lidded}");
                    lidded += 1;
                    map.insert(object.id.clone(), name);
                    continue;
                }
                (_, Some(color), _) => format!("{}_{}", color.name(), object.kind.key_prefix()),
                (ObjectKind::Asset, None, Some(label)) => label.to_owned(),
                _ => {
                    map.insert(object.id.clone(), object.id.to_string());
                    continue;
                }
            };
            let n = counters.entry(base.clone()).or_insert(0);
            let name = if *n == 0 { base } else { format!("{base}{n}") };
            *n += 1;
            map.insert(object.id.clone(), name);
        }

        for object in world.objects().filter(|o| o.kind == ObjectKind::Drawer) {
            let Some(slide) = world.drawer(&object.id) else {
                continue;
            };
            let cabinet = map
                .by_key
                .get(&slide.cabinet)
                .cloned()
                .unwrap_or_else(|| slide.cabinet.to_string());
            let short = object.label.as_deref().unwrap_or("drawer");
            map.insert(object.id.clone(), format!("{cabinet}/{short}"));
        }
        map
    }

    fn insert(&mut self, key: ObjectId, name: String) {
        self.by_name.insert(name.clone(), key.clone());
        self.by_key.insert(key, name);
    }

    /// Rebuild if the world's composition moved on. Returns whether it did.
    pub fn refresh(&mut self, world: &World) -> bool {
        if self.composition == world.composition() && !self.by_key.is_empty() {
            return false;
        }
        *self = Self::build(world);
        true
    }

    /// Display name for a key, falling back to the key itself.
    #[must_use]
    pub fn display(&self, key: &ObjectId) -> String {
        self.by_key
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    /// Number of named objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    /// Returns `true` if nothing is named.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Resolve a user-supplied name to an internal key.
    ///
    /// Tries the display name, then the internal key. A `cabinet/drawer`
    /// path first matches a drawer by its short name when that short name is
    /// unique, then falls back to the cabinet. A bare drawer short name
    /// resolves if exactly one drawer carries it.
    #[must_use]
    pub fn resolve(&self, world: &World, name: &str) -> Option<ObjectId> {
        if let Some(key) = self.by_name.get(name) {
            return Some(key.clone());
        }
        let key = ObjectId::new(name);
        if world.object(&key).is_some() {
            return Some(key);
        }

        if let Some((cabinet, short)) = name.split_once('/') {
            if let Some(drawer) = unique_drawer(world, short) {
                return Some(drawer);
            }
            let cabinet_key = self.resolve(world, cabinet)?;
            return world
                .drawers_of(&cabinet_key)
                .into_iter()
                .find(|d| world.object(d).and_then(|o| o.label.as_deref()) == Some(short));
        }

        unique_drawer(world, name)
    }
}

fn unique_drawer(world: &World, short: &str) -> Option<ObjectId> {
    let mut matches = world
        .objects_of_kind(ObjectKind::Drawer)
        .filter(|o| o.label.as_deref() == Some(short));
    let first = matches.next()?;
    matches.next().is_none().then(|| first.id.clone())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::world::ObjectSpec;
    use desk_types::Color;

    #[test]
    fn test_color_collisions_get_counters() {
        let mut world = World::default();
        let a = world
            .spawn(ObjectSpec::new(ObjectKind::Mug).with_color(Color::Blue))
            .unwrap();
        let b = world
            .spawn(ObjectSpec::new(ObjectKind::Mug).with_color(Color::Blue))
            .unwrap();
        let c = world
            .spawn(ObjectSpec::new(ObjectKind::Box).with_color(Color::Blue))
            .unwrap();
        let names = NameMap::build(&world);
        assert_eq!(names.display(&a), "blue_mug");
        assert_eq!(names.display(&b), "blue_mug1");
        assert_eq!(names.display(&c), "blue_box");
        assert_eq!(names.resolve(&world, "blue_mug1"), Some(b));
    }

    #[test]
    fn test_lidded_boxes_and_fallback_keys() {
        let mut world = World::default();
        let lid = world.spawn(ObjectSpec::new(ObjectKind::LiddedBox)).unwrap();
        let cube = world.spawn(ObjectSpec::new(ObjectKind::Cube)).unwrap();
        let names = NameMap::build(&world);
        assert_eq!(names.display(&lid), "lid_box_0");
        assert_eq!(names.display(&cube), "cube_0");
        assert_eq!(names.resolve(&world, "cube_0"), Some(cube));
        assert!(names.resolve(&world, "cube_9").is_none());
    }

    #[test]
    fn test_drawer_paths() {
        let mut world = World::default();
        let cab = world.spawn(ObjectSpec::short_cabinet()).unwrap();
        let names = NameMap::build(&world);
        let low = world.drawers_of(&cab)[0].clone();

        assert_eq!(names.display(&cab), "short_cabinet");
        assert_eq!(names.display(&low), "short_cabinet/drawer_low");
        assert_eq!(names.resolve(&world, "short_cabinet/drawer_low"), Some(low.clone()));
        assert_eq!(names.resolve(&world, "drawer_low"), Some(low.clone()));
        // Cabinet alias resolves through the cabinet when the short name matches.
        assert_eq!(names.resolve(&world, "asset_0/drawer_low"), Some(low));
    }

    #[test]
    fn test_ambiguous_short_name_falls_back_to_cabinet() {
        let mut world = World::default();
        world.spawn(ObjectSpec::short_cabinet()).unwrap();
        let second = world.spawn(ObjectSpec::short_cabinet()).unwrap();
        let names = NameMap::build(&world);
        let high = world.drawers_of(&second)[2].clone();

        assert!(names.resolve(&world, "drawer_high").is_none());
        assert_eq!(names.resolve(&world, "short_cabinet1/drawer_high"), Some(high));
    }

    #[test]
    fn test_refresh_tracks_composition() {
        let mut world = World::default();
        let mut names = NameMap::build(&world);
        assert!(names.is_empty());
        world.spawn(ObjectSpec::new(ObjectKind::Cube)).unwrap();
        assert!(names.refresh(&world));
        assert!(!names.refresh(&world));
        assert_eq!(names.len(), 1);
    }
}
