use serde::{Deserialize, Serialize};

/// Energy per gram of protein and carbohydrate.
pub const KCAL_PER_GRAM_PROTEIN_CARBS: f64 = 4.0;
/// Energy per gram of fat.
pub const KCAL_PER_GRAM_FAT: f64 = 9.0;

/// Daily goals for a user. Grams for the macros, kcal for calories.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MacroGoals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

impl Default for MacroGoals {
    fn default() -> Self {
        Self {
            calories: 2300.0,
            protein: 185.0,
            carbs: 210.0,
            fats: 55.0,
        }
    }
}

/// Grams of protein, carbs and fats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MacroTotals {
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

impl MacroTotals {
    pub fn new(protein: f64, carbs: f64, fats: f64) -> Self {
        Self {
            protein,
            carbs,
            fats,
        }
    }

    pub fn add(&mut self, other: MacroTotals) {
        self.protein += other.protein;
        self.carbs += other.carbs;
        self.fats += other.fats;
    }

    /// True when at least one gram of anything was recorded.
    pub fn any_logged(&self) -> bool {
        self.protein + self.carbs + self.fats > 0.0
    }

    pub fn rounded(self) -> Self {
        Self::new(round1(self.protein), round1(self.carbs), round1(self.fats))
    }

    pub fn estimated_calories(&self) -> f64 {
        estimate_calories(self.protein, self.carbs, self.fats)
    }
}

impl std::iter::Sum for MacroTotals {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(MacroTotals::default(), |mut acc, m| {
            acc.add(m);
            acc
        })
    }
}

/// Macro values for one unit (serving) of a food.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MacrosPerUnit {
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub fats: f64,
    #[serde(default)]
    pub calories: Option<f64>,
}

impl MacrosPerUnit {
    /// Multiplies by `quantity`, rounding every value to one decimal.
    pub fn scaled(&self, quantity: f64) -> ScaledMacros {
        ScaledMacros {
            totals: MacroTotals::new(
                round1(self.protein * quantity),
                round1(self.carbs * quantity),
                round1(self.fats * quantity),
            ),
            calories: self.calories.map(|c| round1(c * quantity)),
        }
    }
}

/// Macros already multiplied by a quantity, as stored on a meal line item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaledMacros {
    pub totals: MacroTotals,
    pub calories: Option<f64>,
}

impl ScaledMacros {
    /// Explicit calories when known, otherwise the 4/4/9 estimate.
    pub fn calories_or_estimate(&self) -> f64 {
        self.calories.unwrap_or_else(|| self.totals.estimated_calories())
    }
}

pub fn estimate_calories(protein: f64, carbs: f64, fats: f64) -> f64 {
    (protein + carbs) * KCAL_PER_GRAM_PROTEIN_CARBS + fats * KCAL_PER_GRAM_FAT
}

/// Rounds to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
