/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Default number of moves left in the game, when `movestogo` isn't given.
///
/// The soft timeout is the remaining time divided by this.
macro_rules! soft_timeout_divisor {
    () => {
        20
    };
}
pub(crate) use soft_timeout_divisor;

/// Divisor for computing the hard timeout of a search.
macro_rules! hard_timeout_divisor {
    () => {
        5
    };
}
pub(crate) use hard_timeout_divisor;

/// Divisor for computing how much of the time increment to use.
macro_rules! time_inc_divisor {
    () => {
        2
    };
}
pub(crate) use time_inc_divisor;

/// Default value of the `Move Overhead` option, in milliseconds.
macro_rules! move_overhead {
    () => {
        50
    };
}
pub(crate) use move_overhead;

/// Maximum value of the `Move Overhead` option, in milliseconds.
macro_rules! max_move_overhead {
    () => {
        5000
    };
}
pub(crate) use max_move_overhead;

/// How many nodes are searched between checks of the clock and the stop flag.
macro_rules! poll_interval {
    () => {
        1024
    };
}
pub(crate) use poll_interval;

/// Bonus per step of Manhattan distance between a lone King and the center of the board.
macro_rules! mop_up_edge_bonus {
    () => {
        10
    };
}
pub(crate) use mop_up_edge_bonus;

/// Bonus per step the attacking King has closed on a lone King.
macro_rules! mop_up_proximity_bonus {
    () => {
        4
    };
}
pub(crate) use mop_up_proximity_bonus;
