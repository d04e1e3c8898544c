//! Welcome email template.
//!
//! A single embedded HTML document with a `{name}` placeholder. Substitution
//! is plain string replacement; the CSS braces in the document make format
//! machinery more trouble than it is worth.

/// Subject line for the welcome email.
pub const WELCOME_SUBJECT: &str = "Welcome to Our Waitlist!";

/// HTML body template. Customize this!
const WELCOME_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Welcome to Our Waitlist</title>
    <style>
        body {
            font-family: 'Helvetica Neue', Arial, sans-serif;
            line-height: 1.6;
            color: #333333;
            margin: 0;
            padding: 0;
            background-color: #f5f5f5;
        }
        .container {
            max-width: 600px;
            margin: 0 auto;
            padding: 20px;
            background-color: #ffffff;
            border-radius: 8px;
            box-shadow: 0 2px 5px rgba(0,0,0,0.1);
        }
        .header {
            text-align: center;
            padding: 20px 0;
        }
        h1 {
            color: #4a90e2;
            font-size: 24px;
            margin-bottom: 20px;
        }
        p {
            margin-bottom: 16px;
        }
        ul {
            padding-left: 20px;
            margin-bottom: 20px;
        }
        li {
            margin-bottom: 10px;
        }
        .footer {
            margin-top: 30px;
            padding-top: 20px;
            border-top: 1px solid #eeeeee;
            font-size: 12px;
            color: #888888;
            text-align: center;
        }
        .social {
            margin-top: 15px;
        }
        .social a {
            display: inline-block;
            margin: 0 8px;
            color: #4a90e2;
            text-decoration: none;
        }
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>Welcome to Our Waitlist!</h1>
        </div>

        <p>Hi {name},</p>

        <p>Thank you for joining our waitlist! We're excited to have you on board and can't wait to share our product with you.</p>

        <p>Here's what you can expect while on our waitlist:</p>

        <ul>
            <li><strong>Regular Updates:</strong> We'll keep you informed about our progress and launch timeline.</li>
            <li><strong>Early Access:</strong> As a waitlist member, you'll be among the first to access our platform.</li>
            <li><strong>Exclusive Offers:</strong> Special promotions available only to our early supporters.</li>
        </ul>

        <p>We're working hard to create something amazing, and your interest means a lot to us.</p>

        <p>If you have any questions or feedback, feel free to reply to this email directly.</p>

        <p>Best regards,<br>The Team</p>

        <div class="footer">
            <p>&copy; 2025 Your Company. All rights reserved.</p>
            <p>123 Startup Street, San Francisco, CA 94107</p>

            <div class="social">
                <a href="https://twitter.com/yourcompany">Twitter</a> |
                <a href="https://facebook.com/yourcompany">Facebook</a> |
                <a href="https://instagram.com/yourcompany">Instagram</a>
            </div>
        </div>
    </div>
</body>
</html>
"#;

/// Render the welcome email body for a recipient.
pub fn render_welcome(name: &str) -> String {
    WELCOME_TEMPLATE.replace("{name}", name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_welcome_substitutes_name() {
        let html = render_welcome("Jane");
        assert!(html.contains("Hi Jane,"));
        assert!(!html.contains("{name}"));
    }

    #[test]
    fn test_render_welcome_keeps_css_braces() {
        let html = render_welcome("Jane");
        // CSS rules survive substitution untouched.
        assert!(html.contains("font-size: 24px;"));
        assert!(html.contains(".container {"));
    }
}
