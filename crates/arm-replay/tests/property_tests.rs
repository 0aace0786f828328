//! 执行顺序与失败计数的属性测试

mod common;

use arm_replay::{Command, Config, ControllerError, MoveContext, RepeatArmMovements};
use common::FakeArm;
use proptest::prelude::*;
use std::sync::Arc;

fn waypoints_strategy() -> impl Strategy<Value = Vec<Vec<f64>>> {
    prop::collection::vec(prop::collection::vec(-180.0f64..180.0, 1..7), 1..6)
}

proptest! {
    #[test]
    fn prop_execute_issues_r_times_w_moves_in_order(
        waypoints in waypoints_strategy(),
        repeats in 1i64..5,
    ) {
        let arm = Arc::new(FakeArm::new());
        let config = Config::new("arm-1", waypoints.clone(), repeats).unwrap();
        let controller = RepeatArmMovements::new(config, arm.clone());

        let response = controller.dispatch(Command::Execute).unwrap();
        prop_assert_eq!(
            response,
            arm_replay::CommandResponse::Executed { executed_repeats: repeats as u32 }
        );

        let expected: Vec<Vec<f64>> = (0..repeats)
            .flat_map(|_| waypoints.iter().cloned())
            .collect();
        prop_assert_eq!(arm.moves(), expected);
    }

    #[test]
    fn prop_failure_halts_after_k_w_plus_j_plus_one_moves(
        waypoints in waypoints_strategy(),
        repeats in 1i64..5,
        seed in any::<usize>(),
    ) {
        let w = waypoints.len();
        let total = w * repeats as usize;
        let fail_at = seed % total;
        let (k, j) = (fail_at / w, fail_at % w);

        let arm = Arc::new(FakeArm::failing_at(fail_at));
        let config = Config::new("arm-1", waypoints, repeats).unwrap();
        let controller = RepeatArmMovements::new(config, arm.clone());

        let err = controller.dispatch(Command::Execute).unwrap_err();
        prop_assert_eq!(arm.move_count(), k * w + j + 1);
        match err {
            ControllerError::MoveFailed { context, .. } => prop_assert_eq!(
                context,
                MoveContext::Iteration { iteration: k as u32, waypoint: j }
            ),
            other => prop_assert!(false, "expected MoveFailed, got {:?}", other),
        }
    }

    #[test]
    fn prop_move_to_index_in_range(
        waypoints in waypoints_strategy(),
        seed in any::<usize>(),
    ) {
        let index = seed % waypoints.len();
        let arm = Arc::new(FakeArm::new());
        let config = Config::new("arm-1", waypoints.clone(), 1).unwrap();
        let controller = RepeatArmMovements::new(config, arm.clone());

        let response = controller.dispatch(Command::MoveToIndex { index: index as i64 }).unwrap();
        prop_assert_eq!(
            response,
            arm_replay::CommandResponse::MovedToIndex { moved_to_index: index }
        );
        prop_assert_eq!(arm.moves(), vec![waypoints[index].clone()]);
    }

    #[test]
    fn prop_move_to_index_out_of_range(
        waypoints in waypoints_strategy(),
        offset in 0i64..100,
        negative in any::<bool>(),
    ) {
        let bound = waypoints.len();
        let index = if negative { -1 - offset } else { bound as i64 + offset };
        let arm = Arc::new(FakeArm::new());
        let config = Config::new("arm-1", waypoints, 1).unwrap();
        let controller = RepeatArmMovements::new(config, arm.clone());

        prop_assert_eq!(
            controller.dispatch(Command::MoveToIndex { index }),
            Err(ControllerError::IndexOutOfRange { index, bound })
        );
        prop_assert_eq!(arm.move_count(), 0);
    }
}
