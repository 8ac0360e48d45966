use crate::board::Board;

/// True once every ship on the board has been sunk.
///
/// An empty board is never destroyed.
pub fn is_destroyed(board: &Board) -> bool {
    let destroyed = board.ship_count() > 0 && board.ships_afloat() == 0;
    debug_assert_eq!(
        destroyed,
        board.ship_count() > 0 && board.hit_count() == board.occupied_cells()
    );
    destroyed
}
