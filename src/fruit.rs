//! Fruit catalog and the falling instances placed on the play field.

use std::fmt;
use std::ops::Index;

/// Closed catalog of fruits. Declaration order is catalog order: it decides
/// slot assignment and hit-test priority.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Fruit {
    Apple,
    Banana,
    Mango,
    Pineapple,
    Watermelon,
}

impl Fruit {
    pub const ALL: [Fruit; 5] = [
        Fruit::Apple,
        Fruit::Banana,
        Fruit::Mango,
        Fruit::Pineapple,
        Fruit::Watermelon,
    ];

    pub const COUNT: usize = Self::ALL.len();

    pub fn name(self) -> &'static str {
        match self {
            Fruit::Apple => "apple",
            Fruit::Banana => "banana",
            Fruit::Mango => "mango",
            Fruit::Pineapple => "pineapple",
            Fruit::Watermelon => "watermelon",
        }
    }

    /// Upper-case label used in the "Tap on:" prompt.
    pub fn label(self) -> String {
        self.name().to_ascii_uppercase()
    }

    pub fn asset_path(self) -> String {
        format!("assets/{}.png", self.name())
    }

    fn index(self) -> usize {
        self as usize
    }

    /// Map a unit-interval sample onto the catalog. Out-of-range samples clamp
    /// to the nearest end so a misbehaving entropy source still yields a fruit.
    pub fn from_unit(r: f64) -> Fruit {
        let idx = (r * Self::COUNT as f64).floor();
        let idx = if idx.is_nan() || idx < 0.0 {
            0
        } else {
            (idx as usize).min(Self::COUNT - 1)
        };
        Self::ALL[idx]
    }
}

impl fmt::Display for Fruit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One drawable handle per catalog entry. Built once at startup; the array
/// shape makes a missing fruit a compile error rather than a lookup miss.
pub struct FruitImages<I> {
    images: [I; Fruit::COUNT],
}

impl<I> FruitImages<I> {
    pub fn load(mut load: impl FnMut(Fruit) -> I) -> Self {
        Self {
            images: Fruit::ALL.map(&mut load),
        }
    }

    pub fn get(&self, fruit: Fruit) -> &I {
        &self.images[fruit.index()]
    }
}

impl<I> Index<Fruit> for FruitImages<I> {
    type Output = I;

    fn index(&self, fruit: Fruit) -> &I {
        self.get(fruit)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    /// Inclusive on all four edges.
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.x + self.w && py >= self.y && py <= self.y + self.h
    }
}

/// A fruit on the play field for the current round.
#[derive(Clone, Debug, PartialEq)]
pub struct FallingFruit {
    pub fruit: Fruit,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Units per frame.
    pub speed: f64,
}

impl FallingFruit {
    pub fn rect(&self) -> Rect {
        Rect {
            x: self.x,
            y: self.y,
            w: self.width,
            h: self.height,
        }
    }

    pub fn contains(&self, px: f64, py: f64) -> bool {
        self.rect().contains(px, py)
    }

    pub fn advance(&mut self) {
        self.y += self.speed;
    }
}

/// First fruit whose box contains the point, in slice order.
pub fn hit_test(fruits: &[FallingFruit], px: f64, py: f64) -> Option<&FallingFruit> {
    fruits.iter().find(|f| f.contains(px, py))
}
