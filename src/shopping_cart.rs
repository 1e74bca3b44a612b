//! Shopping list export.
//!
//! Ingredients from every recipe in a user's cart are summed by name and
//! rendered one per line, in the order they were first seen.

use crate::orm::{ingredients, recipe_ingredients, shopping_carts};
use indexmap::IndexMap;
use sea_orm::{entity::*, query::*, ConnectionTrait, DbErr};

/// One ingredient use, as read from a cart recipe.
#[derive(Clone, Debug)]
pub struct IngredientUse {
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

/// A line of the shopping list.
#[derive(Clone, Debug, PartialEq)]
pub struct CartLine {
    pub name: String,
    pub measurement_unit: String,
    pub total: i64,
}

/// Sums amounts per ingredient name. The unit of the first occurrence wins.
pub fn aggregate<I>(uses: I) -> Vec<CartLine>
where
    I: IntoIterator<Item = IngredientUse>,
{
    let mut lines: IndexMap<String, CartLine> = IndexMap::new();

    for item in uses {
        match lines.get_mut(&item.name) {
            Some(line) => line.total += item.amount,
            None => {
                lines.insert(
                    item.name.to_owned(),
                    CartLine {
                        name: item.name,
                        measurement_unit: item.measurement_unit,
                        total: item.amount,
                    },
                );
            }
        }
    }

    lines.into_values().collect()
}

/// `"{name} - {total} {unit}."`, one line each.
pub fn render(lines: &[CartLine]) -> String {
    lines
        .iter()
        .map(|line| {
            format!(
                "{} - {} {}.\n",
                line.name, line.total, line.measurement_unit
            )
        })
        .collect()
}

/// Reads the ingredient uses of every recipe in the user's cart, in cart order.
pub async fn load_uses<C>(db: &C, user_id: i32) -> Result<Vec<IngredientUse>, DbErr>
where
    C: ConnectionTrait,
{
    let cart = shopping_carts::Entity::find()
        .filter(shopping_carts::Column::UserId.eq(user_id))
        .order_by_asc(shopping_carts::Column::Id)
        .all(db)
        .await?;

    let mut uses = Vec::new();
    for entry in cart {
        let rows = recipe_ingredients::Entity::find()
            .filter(recipe_ingredients::Column::RecipeId.eq(entry.recipe_id))
            .order_by_asc(recipe_ingredients::Column::Id)
            .find_also_related(ingredients::Entity)
            .all(db)
            .await?;

        for (row, ingredient) in rows {
            if let Some(ingredient) = ingredient {
                uses.push(IngredientUse {
                    name: ingredient.name,
                    measurement_unit: ingredient.measurement_unit,
                    amount: i64::from(row.amount),
                });
            }
        }
    }

    Ok(uses)
}

/// Builds the text report for a user's cart.
pub async fn export<C>(db: &C, user_id: i32) -> Result<String, DbErr>
where
    C: ConnectionTrait,
{
    let lines = aggregate(load_uses(db, user_id).await?);
    log::debug!(
        "shopping list for user_id={} has {} lines",
        user_id,
        lines.len()
    );
    Ok(render(&lines))
}
