//! Input validation utilities

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;
use uuid::Uuid;

use crate::models::recipe::IngredientAmount;

/// Validate username
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("Username is required".to_string());
    }

    if username.len() > 150 {
        return Err("Username must be at most 150 characters long".to_string());
    }

    static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = USERNAME_REGEX.get_or_init(|| {
        Regex::new(r"^[\w.@+-]+$").expect("Failed to compile username regex")
    });

    if !regex.is_match(username) {
        return Err(
            "Username can only contain letters, digits, and . @ + - characters".to_string(),
        );
    }

    Ok(())
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.len() < 8 {
        return Err("Password must be at least 8 characters long".to_string());
    }

    if password.len() > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }

    Ok(())
}

/// Validate recipe cooking time
pub fn validate_cooking_time(cooking_time: i32) -> Result<(), String> {
    if cooking_time < 1 {
        return Err("Cooking time must be a positive number of minutes".to_string());
    }
    Ok(())
}

/// Validate a recipe's ingredient list: no duplicate ingredient ids within
/// one payload, and every amount at least 1
pub fn validate_recipe_ingredients(ingredients: &[IngredientAmount]) -> Result<(), String> {
    let mut seen = HashSet::new();
    for entry in ingredients {
        if !seen.insert(entry.id) {
            return Err("Each ingredient may only be listed once".to_string());
        }
        if entry.amount < 1 {
            return Err("Ingredient amounts must be positive".to_string());
        }
    }
    Ok(())
}

/// Validate a recipe's tag list: no duplicate tag ids within one payload
pub fn validate_recipe_tags(tags: &[Uuid]) -> Result<(), String> {
    let mut seen = HashSet::new();
    for tag in tags {
        if !seen.insert(*tag) {
            return Err("Each tag may only be listed once".to_string());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username() {
        assert!(validate_username("chef.anna").is_ok());
        assert!(validate_username("user+tag@host-1").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username("semi;colon").is_err());
        assert!(validate_username(&"a".repeat(151)).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("anna@example.com").is_ok());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("longenough1").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_password("").is_err());
    }

    #[test]
    fn test_validate_cooking_time() {
        assert!(validate_cooking_time(1).is_ok());
        assert!(validate_cooking_time(0).is_err());
        assert!(validate_cooking_time(-5).is_err());
    }

    #[test]
    fn test_validate_recipe_ingredients_rejects_duplicates() {
        let id = Uuid::new_v4();
        let payload = vec![
            IngredientAmount { id, amount: 2 },
            IngredientAmount { id, amount: 3 },
        ];
        assert!(validate_recipe_ingredients(&payload).is_err());
    }

    #[test]
    fn test_validate_recipe_ingredients_rejects_non_positive_amount() {
        let payload = vec![IngredientAmount {
            id: Uuid::new_v4(),
            amount: 0,
        }];
        assert!(validate_recipe_ingredients(&payload).is_err());
    }

    #[test]
    fn test_validate_recipe_ingredients_accepts_distinct() {
        let payload = vec![
            IngredientAmount {
                id: Uuid::new_v4(),
                amount: 1,
            },
            IngredientAmount {
                id: Uuid::new_v4(),
                amount: 100,
            },
        ];
        assert!(validate_recipe_ingredients(&payload).is_ok());
    }

    #[test]
    fn test_validate_recipe_tags() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert!(validate_recipe_tags(&[a, b]).is_ok());
        assert!(validate_recipe_tags(&[a, a]).is_err());
        assert!(validate_recipe_tags(&[]).is_ok());
    }
}
