//! Solidity interface of the vesting contract.
#![allow(missing_docs)]
#![allow(clippy::pub_underscore_fields)]
use alloy::sol;

sol! {
    /// Linear vesting with an optional cliff, for native currency and ERC-20
    /// tokens.
    interface TokenVesting {
        function createStream(
            address recipient,
            address tokenAddress,
            uint256 totalAmount,
            uint256 startTime,
            uint256 cliffDuration,
            uint256 streamDuration
        ) external payable;

        function claimTokens(uint256 streamId) external;

        function cancelStream(uint256 streamId) external;

        function getRecipientStreams(address recipient)
            external
            view
            returns (uint256[] memory streamIds);

        function getStreamDetails(uint256 streamId)
            external
            view
            returns (
                address creator,
                address recipient,
                address tokenAddress,
                uint256 totalAmount,
                uint256 amountClaimed,
                uint256 startTime,
                uint256 cliffDuration,
                uint256 streamDuration,
                bool isCancelled
            );
    }
}

/// Number of ABI words returned by `getStreamDetails`. Every field is static,
/// so the return data is exactly this many words long.
pub const STREAM_DETAILS_ARITY: usize = 9;

/// Size of an ABI word in bytes.
pub const WORD_BYTES: usize = 32;
