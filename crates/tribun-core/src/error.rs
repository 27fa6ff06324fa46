/// Every fallible operation in this workspace returns this type. No
/// operation panics or logs on the caller's behalf; callers decide what to
/// do with the reason.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum CoreError {
    #[error("{0} is not an on-board tile id")]
    InvalidCid(u8),

    #[error("{field} value {value} does not fit its encoded range")]
    EncodeRange { field: &'static str, value: i64 },

    #[error("opcode {0} is reserved")]
    UnknownOpcode(u8),

    #[error("byte {0:#04x} is not a valid unit encoding")]
    InvalidUnitByte(u8),

    #[error("board snapshot is malformed: {0}")]
    MalformedSnapshot(&'static str),

    #[error("action is illegal: {0}")]
    Illegal(#[from] IllegalReason),
}

/// Why an applier call rejected an otherwise well-formed action. Closed: one
/// match arm here can always be written as an exhaustive `match`.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum IllegalReason {
    #[error("the game has already ended")]
    GameEnded,
    #[error("it is not this color's turn")]
    WrongTurn,
    #[error("origin tile is not owned by the acting color")]
    NotOwned,
    #[error("origin tile is empty")]
    EmptyOrigin,
    #[error("destination tile is not reachable under the unit's pattern")]
    UnreachableDestination,
    #[error("destination tile is occupied")]
    DestinationOccupied,
    #[error("target tile is empty")]
    EmptyTarget,
    #[error("target tile does not hold an enemy unit")]
    TargetNotEnemy,
    #[error("target tile holds a tribun and must be attacked with ATTACK_TRIBUN")]
    TargetIsTribun,
    #[error("target tile does not hold a tribun")]
    TargetNotTribun,
    #[error("no attacker in the participation set can reach this target")]
    NoAttacker,
    #[error("aggregate attacker strength does not meet or exceed target height")]
    InsufficientStrength,
    #[error("target already holds an enslaved secondary unit")]
    AlreadyEnslaved,
    #[error("enslaved unit fails the slave property and does not survive normalization")]
    EnslaveNormalizationFailed,
    #[error("target has no secondary unit to liberate")]
    NothingToLiberate,
    #[error("donor tile is not adjacent to the center tile")]
    DonorNotAdjacent,
    #[error("donor is not owned by the acting color")]
    DonorNotOwned,
    #[error("center tile is not empty")]
    CenterOccupied,
    #[error("donation amount is out of range for the donor's height")]
    DonateOutOfRange,
    #[error("a tribun donor must donate its entire primary height")]
    TribunPartialDonation,
    #[error("symmetric combine configuration does not match board state")]
    SymConfigMismatch,
    #[error("split heights exceed the unit's primary height")]
    SplitCapacityExceeded,
    #[error("a split height is not a valid stored height")]
    SplitInvalidHeight,
    #[error("split must produce at least two owned occupied tiles")]
    SplitInsufficientSlots,
    #[error("a tribun unit cannot be split")]
    SplitTribunForbidden,
    #[error("split destination tile is not empty")]
    SplitDestinationOccupied,
    #[error("acting unit has no secondary unit to leave behind")]
    BackstabbNoSlave,
    #[error("backstabb destination tile is not empty")]
    BackstabbDestinationOccupied,
    #[error("there is no pending draw offer to act on")]
    NoDrawOffer,
    #[error("a draw offer is already pending")]
    DrawOfferPending,
    #[error("the acting color cannot accept its own draw offer")]
    CannotAcceptOwnOffer,
}
