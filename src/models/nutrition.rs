//! Shared nutrition data structure
//!
//! Used for food entries, day totals and targets.

use serde::{Deserialize, Serialize};

/// Unit a nutrient is measured in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Kcal,
    G,
    Mg,
    Ml,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Kcal => "kcal",
            Unit::G => "g",
            Unit::Mg => "mg",
            Unit::Ml => "ml",
        }
    }
}

/// The eight tracked nutrients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Nutrient {
    Calories,
    Protein,
    Carbs,
    Fat,
    Fiber,
    Sugar,
    Sodium,
    Cholesterol,
}

impl Nutrient {
    pub const ALL: [Nutrient; 8] = [
        Nutrient::Calories,
        Nutrient::Protein,
        Nutrient::Carbs,
        Nutrient::Fat,
        Nutrient::Fiber,
        Nutrient::Sugar,
        Nutrient::Sodium,
        Nutrient::Cholesterol,
    ];

    pub fn unit(&self) -> Unit {
        match self {
            Nutrient::Calories => Unit::Kcal,
            Nutrient::Sodium | Nutrient::Cholesterol => Unit::Mg,
            _ => Unit::G,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Nutrient::Calories => "calories",
            Nutrient::Protein => "protein",
            Nutrient::Carbs => "carbs",
            Nutrient::Fat => "fat",
            Nutrient::Fiber => "fiber",
            Nutrient::Sugar => "sugar",
            Nutrient::Sodium => "sodium",
            Nutrient::Cholesterol => "cholesterol",
        }
    }
}

/// Nutritional totals in canonical units
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutrition {
    pub calories: f64,
    pub protein: f64,     // grams
    pub carbs: f64,       // grams
    pub fat: f64,         // grams
    pub fiber: f64,       // grams
    pub sugar: f64,       // grams
    pub sodium: f64,      // milligrams
    pub cholesterol: f64, // milligrams
}

impl Nutrition {
    pub fn zero() -> Self {
        Self::default()
    }

    /// Look up a single nutrient
    pub fn get(&self, nutrient: Nutrient) -> f64 {
        match nutrient {
            Nutrient::Calories => self.calories,
            Nutrient::Protein => self.protein,
            Nutrient::Carbs => self.carbs,
            Nutrient::Fat => self.fat,
            Nutrient::Fiber => self.fiber,
            Nutrient::Sugar => self.sugar,
            Nutrient::Sodium => self.sodium,
            Nutrient::Cholesterol => self.cholesterol,
        }
    }

    /// Add another nutrition to this one
    pub fn add(&self, other: &Nutrition) -> Self {
        Self {
            calories: self.calories + other.calories,
            protein: self.protein + other.protein,
            carbs: self.carbs + other.carbs,
            fat: self.fat + other.fat,
            fiber: self.fiber + other.fiber,
            sugar: self.sugar + other.sugar,
            sodium: self.sodium + other.sodium,
            cholesterol: self.cholesterol + other.cholesterol,
        }
    }
}

impl std::ops::Add for Nutrition {
    type Output = Nutrition;

    fn add(self, other: Nutrition) -> Nutrition {
        Nutrition::add(&self, &other)
    }
}

impl std::iter::Sum for Nutrition {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Nutrition::zero(), |acc, n| acc + n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units() {
        assert_eq!(Nutrient::Calories.unit(), Unit::Kcal);
        assert_eq!(Nutrient::Protein.unit(), Unit::G);
        assert_eq!(Nutrient::Sodium.unit(), Unit::Mg);
        assert_eq!(Nutrient::Cholesterol.unit(), Unit::Mg);
    }

    #[test]
    fn test_sum() {
        let a = Nutrition { calories: 100.0, sodium: 20.0, ..Default::default() };
        let b = Nutrition { calories: 50.0, protein: 5.0, ..Default::default() };
        let total: Nutrition = vec![a, b].into_iter().sum();
        assert_eq!(total.calories, 150.0);
        assert_eq!(total.get(Nutrient::Protein), 5.0);
        assert_eq!(total.get(Nutrient::Sodium), 20.0);
    }
}
