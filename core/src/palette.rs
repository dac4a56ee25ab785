use hashbrown::HashSet;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::*;

const CLASSIC: [(&str, Rgba); 8] = [
    ("red", Rgba::opaque(255, 59, 48)),
    ("blue", Rgba::opaque(0, 122, 255)),
    ("green", Rgba::opaque(52, 199, 89)),
    ("yellow", Rgba::opaque(255, 204, 0)),
    ("orange", Rgba::opaque(255, 149, 0)),
    ("purple", Rgba::opaque(175, 82, 222)),
    ("brown", Rgba::opaque(162, 132, 94)),
    ("gray", Rgba::opaque(142, 142, 147)),
];

const EXTRA: [(&str, Rgba); 20] = [
    ("pink", Rgba::opaque(255, 45, 85)),
    ("cyan", Rgba::opaque(50, 173, 230)),
    ("mint", Rgba::opaque(0, 199, 190)),
    ("teal", Rgba::opaque(48, 176, 199)),
    ("indigo", Rgba::opaque(88, 86, 214)),
    ("black", Rgba::opaque(0, 0, 0)),
    ("white", Rgba::opaque(255, 255, 255)),
    ("navy", Rgba::opaque(0, 0, 128)),
    ("maroon", Rgba::opaque(128, 0, 0)),
    ("olive", Rgba::opaque(128, 128, 0)),
    ("lime", Rgba::opaque(50, 205, 50)),
    ("gold", Rgba::opaque(212, 175, 55)),
    ("silver", Rgba::opaque(192, 192, 192)),
    ("coral", Rgba::opaque(255, 127, 80)),
    ("salmon", Rgba::opaque(250, 128, 114)),
    ("violet", Rgba::opaque(238, 130, 238)),
    ("turquoise", Rgba::opaque(64, 224, 208)),
    ("beige", Rgba::opaque(245, 245, 220)),
    ("lavender", Rgba::opaque(230, 230, 250)),
    ("khaki", Rgba::opaque(195, 176, 145)),
];

/// Pool of distinct colors boards are painted from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette {
    colors: Vec<NamedColor>,
}

impl Palette {
    /// Builds a palette, dropping colors whose name was already seen.
    pub fn new(colors: impl IntoIterator<Item = NamedColor>) -> Self {
        let mut seen = HashSet::new();
        let colors = colors
            .into_iter()
            .filter(|color| {
                let fresh = seen.insert(color.name().to_owned());
                if !fresh {
                    log::warn!("Duplicate palette color {:?} ignored", color.name());
                }
                fresh
            })
            .collect();
        Self { colors }
    }

    /// The eight colors of the first version of the game.
    pub fn classic() -> Self {
        Self::from_table(CLASSIC.iter())
    }

    /// Classic colors plus enough named colors to fill a hard board without generated ones.
    pub fn extended() -> Self {
        Self::from_table(CLASSIC.iter().chain(EXTRA.iter()))
    }

    fn from_table<'a>(table: impl Iterator<Item = &'a (&'static str, Rgba)>) -> Self {
        Self::new(
            table
                .zip(0..)
                .map(|(&(name, value), id)| NamedColor::new(id, value, name)),
        )
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[NamedColor] {
        &self.colors
    }

    /// Picks `count` colors with distinct names, in random order.
    ///
    /// When the palette runs out, random opaque colors named after their hex code are generated.
    pub(crate) fn draw<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<NamedColor> {
        let mut drawn = self.colors.clone();
        drawn.shuffle(rng);
        drawn.truncate(count);

        if drawn.len() < count {
            log::debug!(
                "Palette has {} colors but {} are needed, generating the rest",
                self.colors.len(),
                count
            );
            let mut names: HashSet<String> =
                drawn.iter().map(|color| color.name().to_owned()).collect();
            let mut next_id = self
                .colors
                .iter()
                .map(NamedColor::id)
                .max()
                .map_or(0, |id| id.saturating_add(1));
            while drawn.len() < count {
                let value = Rgba::opaque(rng.random(), rng.random(), rng.random());
                let name = value.to_hex();
                if names.insert(name.clone()) {
                    drawn.push(NamedColor::new(next_id, value, name));
                    next_id = next_id.saturating_add(1);
                }
            }
        }

        drawn
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::extended()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn classic_palette_has_the_first_eight_colors() {
        let names: Vec<_> = Palette::classic()
            .colors()
            .iter()
            .map(|color| color.name().to_owned())
            .collect();
        assert_eq!(
            names,
            ["red", "blue", "green", "yellow", "orange", "purple", "brown", "gray"]
        );
    }

    #[test]
    fn extended_palette_covers_a_hard_board() {
        let needed = usize::from(area(Difficulty::Hard.dimension())).div_ceil(2);
        assert!(Palette::extended().len() >= needed);
    }

    #[test]
    fn duplicate_names_are_dropped() {
        let palette = Palette::new([
            NamedColor::new(0, Rgba::opaque(255, 0, 0), "red"),
            NamedColor::new(1, Rgba::opaque(250, 0, 0), "red"),
            NamedColor::new(2, Rgba::opaque(0, 0, 255), "blue"),
        ]);
        assert_eq!(palette.len(), 2);
    }

    #[test]
    fn draw_generates_unique_colors_past_the_palette() {
        let mut rng = SmallRng::seed_from_u64(7);
        let drawn = Palette::classic().draw(30, &mut rng);

        assert_eq!(drawn.len(), 30);
        let names: HashSet<_> = drawn.iter().map(NamedColor::name).collect();
        assert_eq!(names.len(), 30);
        assert!(drawn.iter().any(|color| color.name().starts_with('#')));
    }

    #[test]
    fn draw_from_empty_palette_still_fills() {
        let mut rng = SmallRng::seed_from_u64(1);
        let drawn = Palette::new([]).draw(3, &mut rng);
        assert_eq!(drawn.len(), 3);
    }
}
