//! Class conversations: message lifecycle and page assembly.

pub mod assembler;
pub mod service;
pub mod validation;
pub mod view;

pub use assembler::MessageAssembler;
pub use service::{ConversationService, SendMessage};
pub use view::{
    AttachmentView, ConversationJoined, MessageEdit, MessageView, ReactionDelta, ReplyPreview,
    UserView,
};
