use crate::catalog::ItemTier;
use crate::position::Position;
use crate::random::RandomSource;
use crate::rewards::ExchangeRewards;
use crate::task::{Requirement, Task, TaskCategory, rewards};

use super::task_id;

pub(super) fn generate(
    position: Position,
    policy: &ExchangeRewards,
    rng: &mut dyn RandomSource,
) -> Task {
    let item_tier = ItemTier::ALL[rng.weighted_index(&policy.weights())];
    let items = item_tier.items();
    let item = items[rng.pick_index(items.len())];
    let tier = policy.tier(item_tier);
    let quantity = tier.quantity.draw(rng);

    Task {
        id: task_id(TaskCategory::GrandExchange, position),
        category: TaskCategory::GrandExchange,
        difficulty: tier.difficulty,
        title: format!("Grand Exchange: {item}"),
        description: format!("Buy {quantity}× {item} from the Grand Exchange"),
        requirements: vec![Requirement::Item {
            name: item.to_string(),
            quantity,
        }],
        rewards: rewards(tier.keys, tier.gold),
    }
}
