//! Contract surfaces of the supported minting protocols.
//!
//! Declared inline rather than from vendored ABI JSON: only the sale
//! configuration accessors, mint entrypoints and allowlist events are
//! needed, not the full protocol ABI.

#[allow(clippy::too_many_arguments)]
pub mod foundation {
    alloy::sol!(
        #[derive(Debug)]
        #[sol(rpc)]
        interface INFTDropMarket {
            /// Fixed-price sale terms, original release. A zeroed/reverting
            /// response means no sale is configured for the contract.
            function getFixedPriceSale(address nftContract)
                external
                view
                returns (
                    address seller,
                    uint256 price,
                    uint256 limitPerAccount,
                    uint256 numberOfTokensAvailableToMint,
                    bool marketCanMint,
                    uint256 generalAvailabilityStartTime,
                    uint256 earlyAccessStartTime
                );

            /// Fixed-price sale terms with the per-NFT mint fee introduced
            /// in the V2 market. Presence of this accessor decides which
            /// mint entrypoint the sale must be filled through.
            function getFixedPriceSaleV2(address nftContract)
                external
                view
                returns (
                    address seller,
                    uint256 price,
                    uint256 limitPerAccount,
                    uint256 numberOfTokensAvailableToMint,
                    bool marketCanMint,
                    uint256 generalAvailabilityStartTime,
                    uint256 earlyAccessStartTime,
                    uint256 mintFeePerNftInWei
                );

            function mintFromFixedPriceSale(
                address nftContract,
                uint16 count,
                address buyReferrer
            ) external payable returns (uint256 firstTokenId);

            function mintFromFixedPriceSaleV2(
                address nftContract,
                uint16 count,
                address buyReferrer
            ) external payable returns (uint256 firstTokenId);

            function mintFromFixedPriceSaleWithEarlyAccessAllowlist(
                address nftContract,
                uint256 count,
                address buyReferrer,
                bytes32[] calldata proof
            ) external payable returns (uint256 firstTokenId);

            /// Emitted when a seller attaches an early-access allowlist to
            /// a fixed-price sale. `merkleTreeUri` points at the off-chain
            /// leaf set (ipfs/ar content URI).
            event AddMerkleRootToFixedPriceSale(
                address indexed nftContract,
                bytes32 merkleRoot,
                string merkleTreeUri
            );
        }
    );
}

#[allow(clippy::too_many_arguments)]
pub mod zora {
    alloy::sol!(
        #[derive(Debug)]
        #[sol(rpc)]
        interface IZoraCreator1155 {
            function mintFee() external view returns (uint256);

            /// Per-mint protocol reward, pre-rewards-v2 signature.
            function computeTotalReward(uint256 numTokens)
                external
                view
                returns (uint256);

            /// Per-mint protocol reward, rewards-v2 signature.
            function computeTotalReward(uint256 mintPrice, uint256 numTokens)
                external
                view
                returns (uint256);

            function getTokenInfo(uint256 tokenId)
                external
                view
                returns (string memory uri, uint256 maxSupply, uint256 totalMinted);

            function nextTokenId() external view returns (uint256);

            function mint(
                address minter,
                uint256 tokenId,
                uint256 quantity,
                bytes calldata minterArguments
            ) external payable;

            function mint(
                address minter,
                uint256 tokenId,
                uint256 quantity,
                address[] calldata rewardsRecipients,
                bytes calldata minterArguments
            ) external payable;

            function mintWithRewards(
                address minter,
                uint256 tokenId,
                uint256 quantity,
                bytes calldata minterArguments,
                address mintReferral
            ) external payable;

            function multicall(bytes[] calldata data)
                external
                returns (bytes[] memory results);
        }

        #[derive(Debug)]
        #[sol(rpc)]
        interface IFixedPriceMinter {
            struct SalesConfig {
                uint64 saleStart;
                uint64 saleEnd;
                uint64 maxTokensPerAddress;
                uint96 pricePerToken;
                address fundsRecipient;
            }

            function sale(address tokenContract, uint256 tokenId)
                external
                view
                returns (SalesConfig memory);
        }

        #[derive(Debug)]
        #[sol(rpc)]
        interface IMerkleMinter {
            struct MerkleSaleSettings {
                uint64 presaleStart;
                uint64 presaleEnd;
                address fundsRecipient;
                bytes32 merkleRoot;
            }

            function sale(address tokenContract, uint256 tokenId)
                external
                view
                returns (MerkleSaleSettings memory);
        }

        #[derive(Debug)]
        #[sol(rpc)]
        interface IERC20Minter {
            struct ERC20SalesConfig {
                uint64 saleStart;
                uint64 saleEnd;
                uint64 maxTokensPerAddress;
                uint256 pricePerToken;
                address fundsRecipient;
                address currency;
            }

            function sale(address tokenContract, uint256 tokenId)
                external
                view
                returns (ERC20SalesConfig memory);

            function mint(
                address mintTo,
                uint256 quantity,
                address tokenAddress,
                uint256 tokenId,
                uint256 totalValue,
                address currency,
                address mintReferral,
                string calldata comment
            ) external;
        }
    );
}
